//! `pricewatch list` — table of monitored products.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::models::PriceStatus;
use crate::db::Database;
use anyhow::Result;

pub async fn run(settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let products = db.products(true)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "products": products }));
        return Ok(());
    }

    if products.is_empty() {
        println!("  No products being monitored.");
        println!("  Add one with: pricewatch add <url> <target_price>");
        return Ok(());
    }

    let s = Styled::new();
    println!("\n  Monitored products ({})\n", products.len());
    println!(
        "  {:>4}  {:<10}{:<42}{:>14}{:>14}  {}",
        "ID", "Store", "Product", "Current", "Target", "Status"
    );

    for p in &products {
        let status = match p.price_status() {
            PriceStatus::TargetReached => s.ok_sym(),
            PriceStatus::Monitoring => " ",
            PriceStatus::Unknown => s.warn_sym(),
        };
        println!(
            "  {:>4}  {:<10}{:<42}{:>14}{:>14}  {}",
            p.id,
            p.store.display_name(),
            output::truncate(p.title.as_deref().unwrap_or("--"), 40),
            output::format_brl(p.current_price),
            output::format_brl(Some(p.target_price)),
            status,
        );
    }
    println!();

    Ok(())
}
