//! `pricewatch check` — current target hits and σ deals, no network.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use crate::monitor;
use anyhow::Result;
use chrono::Utc;

pub async fn run(settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let now = Utc::now();
    let s = Styled::new();

    let at_target = db.products_at_target()?;
    let sigma_deals = monitor::deal_candidates(&db, &settings.stats_windows, 1, now)?;
    let all = db.products(true)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "at_target": at_target,
            "sigma_deals": sigma_deals,
            "monitored": all.len(),
        }));
        return Ok(());
    }

    if at_target.is_empty() {
        println!("  No products at target price yet.");
    } else {
        println!("\n  {} {} product(s) at or below target:\n", s.ok_sym(), at_target.len());
        for p in &at_target {
            let savings = p
                .current_price
                .map(|c| p.target_price - c)
                .filter(|d| *d >= rust_decimal::Decimal::ZERO);
            println!(
                "    [{}] {}  {}  (saves {})",
                p.store.display_name(),
                output::truncate(p.title.as_deref().unwrap_or("--"), 40),
                output::format_brl(p.current_price),
                output::format_brl(savings),
            );
        }
    }

    if !sigma_deals.is_empty() {
        println!("\n  {} {} statistical deal signal(s):\n", s.warn_sym(), sigma_deals.len());
        for deal in &sigma_deals {
            if let Some(product) = db.product_by_id(deal.product_id)? {
                println!(
                    "    [{}d window] {}  {} ≤ threshold {}",
                    deal.window_days,
                    output::truncate(product.title.as_deref().unwrap_or("--"), 36),
                    output::format_brl(Some(deal.current_price)),
                    output::format_brl(Some(deal.threshold)),
                );
            }
        }
    }

    println!(
        "\n  Summary: {}/{} products at target price",
        at_target.len(),
        all.len()
    );

    Ok(())
}
