//! `pricewatch alerts` — list triggered alerts.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use anyhow::Result;

pub async fn run(settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let triggered = db.triggered_alerts()?;

    if output::is_json() {
        let items: Vec<serde_json::Value> = triggered
            .iter()
            .map(|(alert, product)| serde_json::json!({ "alert": alert, "product": product }))
            .collect();
        output::print_json(&serde_json::json!({ "triggered": items }));
        return Ok(());
    }

    if triggered.is_empty() {
        println!("  No triggered alerts.");
        return Ok(());
    }

    let s = Styled::new();
    println!("\n  Triggered alerts ({})\n", triggered.len());
    for (alert, product) in &triggered {
        println!(
            "  {} {}",
            s.ok_sym(),
            output::truncate(product.title.as_deref().unwrap_or("--"), 50)
        );
        println!(
            "      triggered at {} for {}",
            alert
                .triggered_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "--".to_string()),
            output::format_brl(alert.triggered_price),
        );
        println!("      current {} / target {}",
            output::format_brl(product.current_price),
            output::format_brl(Some(product.target_price)),
        );
        println!("      {}", product.url);
    }
    println!();

    Ok(())
}
