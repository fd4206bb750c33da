//! `pricewatch update` — re-scrape every active product.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use crate::monitor;
use crate::scrape::{ScrapeConfig, Scraper};
use anyhow::Result;

pub async fn run(settings: &Settings) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let s = Styled::new();

    if !output::is_quiet() && !output::is_json() {
        println!("  Updating prices for all products...");
        println!("  Requests are sequential with delays; this may take a while.\n");
    }

    let mut scraper = Scraper::new(ScrapeConfig::from_settings(settings));
    let summary = monitor::update_all_prices(&db, &mut scraper, settings).await?;
    let fired = monitor::check_alerts(&db, &summary.updated)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "updated": summary.updated.len(),
            "failures": summary
                .failures
                .iter()
                .map(|f| serde_json::json!({
                    "product_id": f.product_id,
                    "label": f.label,
                    "error": f.error,
                }))
                .collect::<Vec<_>>(),
            "alerts_fired": fired.len(),
        }));
        return Ok(());
    }

    println!("\n  {} Updated {} product(s)", s.ok_sym(), summary.updated.len());

    if !summary.failures.is_empty() {
        println!("  {} {} item(s) failed:", s.fail_sym(), summary.failures.len());
        for failure in &summary.failures {
            println!(
                "    #{} {}: {}",
                failure.product_id,
                output::truncate(&failure.label, 36),
                failure.error
            );
        }
    }

    for hit in &fired {
        println!("\n  {} PRICE ALERT", s.ok_sym());
        println!(
            "    {}",
            output::truncate(hit.product.title.as_deref().unwrap_or("--"), 50)
        );
        println!(
            "    now {} (target {})",
            output::format_brl(Some(hit.triggered_price)),
            output::format_brl(Some(hit.product.target_price)),
        );
        println!("    {}", hit.product.url);
    }

    Ok(())
}
