//! `pricewatch deals` — ranked best-deals view (2σ across all windows).

use crate::cli::output;
use crate::config::Settings;
use crate::db::Database;
use crate::monitor;
use anyhow::Result;
use chrono::Utc;

pub async fn run(settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let ranked = monitor::best_deals(&db, settings, Utc::now())?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "deals": ranked }));
        return Ok(());
    }

    if ranked.is_empty() {
        println!("  No exceptional deals right now.");
        println!("  (A product qualifies when its price sits 2σ below a window mean.)");
        return Ok(());
    }

    println!("\n  Best deals ({})\n", ranked.len());
    for (rank, deal) in ranked.iter().enumerate() {
        let title = db
            .product_by_id(deal.product_id)?
            .and_then(|p| p.title)
            .unwrap_or_else(|| format!("product #{}", deal.product_id));
        println!(
            "  {:>2}. {}  {}  ({} below the {}d 2σ threshold {})",
            rank + 1,
            output::truncate(&title, 40),
            output::format_brl(Some(deal.current_price)),
            output::format_brl(Some(deal.margin)),
            deal.window_days,
            output::format_brl(Some(deal.threshold)),
        );
    }
    println!();

    Ok(())
}
