//! `pricewatch history <id>` — price history with window statistics.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use crate::stats;
use anyhow::{bail, Result};
use chrono::Utc;

pub async fn run(settings: &Settings, product_id: i64, days: u32) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let now = Utc::now();

    let Some(product) = db.product_by_id(product_id)? else {
        bail!("product with ID {product_id} not found");
    };
    let history = db.history(product_id, days, now)?;
    let statistics = stats::compute(&history, days, now);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "product": product,
            "history": history,
            "statistics": statistics,
        }));
        return Ok(());
    }

    let s = Styled::new();
    println!(
        "\n  Price history: {}",
        output::truncate(product.title.as_deref().unwrap_or("--"), 40)
    );
    println!("  Target: {}\n", output::format_brl(Some(product.target_price)));

    if history.is_empty() {
        println!("  No price history in the last {days} days.");
        return Ok(());
    }

    match &statistics {
        Some(st) => {
            println!("  Statistics (last {days} days, {} samples):", st.samples);
            println!("    Mean:      {}", output::format_brl(Some(st.mean_display())));
            println!("    Std dev:   {}", output::format_brl(Some(st.std_dev_display())));
            println!("    1σ floor:  {}", output::format_brl(Some(st.threshold_display(1))));
            println!("    2σ floor:  {}", output::format_brl(Some(st.threshold_display(2))));
        }
        None => {
            println!("  Statistics: not enough samples yet (need at least 2 in the window).");
        }
    }

    println!("\n  Recent prices:");
    for obs in history.iter().rev().take(15) {
        let at_target = if obs.price <= product.target_price {
            s.ok_sym()
        } else {
            " "
        };
        println!(
            "    {}  {:>14}  {}",
            obs.recorded_at.format("%Y-%m-%d %H:%M"),
            output::format_brl(Some(obs.price)),
            at_target,
        );
    }

    Ok(())
}
