//! `pricewatch detail <id>` — full product card with per-window statistics.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use crate::deals;
use crate::stats;
use anyhow::{bail, Result};
use chrono::Utc;

pub async fn run(settings: &Settings, product_id: i64) -> Result<()> {
    let db = Database::open(&settings.db_path)?;
    let now = Utc::now();

    let Some(product) = db.product_by_id(product_id)? else {
        bail!("product with ID {product_id} not found");
    };

    let max_window = settings.stats_windows.iter().copied().max().unwrap_or(30);
    let history = db.history(product_id, max_window, now)?;

    let mut windows = Vec::new();
    for &window in &settings.stats_windows {
        windows.push((window, stats::compute(&history, window, now)));
    }

    if output::is_json() {
        let window_stats: Vec<serde_json::Value> = windows
            .iter()
            .map(|(w, st)| serde_json::json!({ "window_days": w, "statistics": st }))
            .collect();
        output::print_json(&serde_json::json!({
            "product": product,
            "windows": window_stats,
        }));
        return Ok(());
    }

    let s = Styled::new();
    println!("\n  {}", product.title.as_deref().unwrap_or("--"));
    println!("  {}", product.url);
    println!("\n  ID:       {}", product.id);
    println!("  Store:    {}", product.store.display_name());
    println!("  SKU:      {}", product.sku);
    println!("\n  Prices:");
    println!("    Current:  {}", output::format_brl(product.current_price));
    println!("    Target:   {}", output::format_brl(Some(product.target_price)));
    println!("    Lowest:   {}", output::format_brl(product.lowest_price));
    println!("    Highest:  {}", output::format_brl(product.highest_price));

    for (window, st) in &windows {
        match st {
            Some(st) => {
                let deal_mark = product
                    .current_price
                    .map(|c| {
                        if deals::qualifies(c, st, 2) {
                            format!("  {} 2σ deal", s.ok_sym())
                        } else if deals::qualifies(c, st, 1) {
                            format!("  {} 1σ deal", s.ok_sym())
                        } else {
                            String::new()
                        }
                    })
                    .unwrap_or_default();
                println!(
                    "    Avg {window}d:  {} (σ {}){deal_mark}",
                    output::format_brl(Some(st.mean_display())),
                    output::format_brl(Some(st.std_dev_display())),
                );
            }
            None => println!("    Avg {window}d:  -- (not enough samples)"),
        }
    }

    if let Some(current) = product.current_price {
        if current <= product.target_price {
            println!(
                "\n  {} At target! Savings: {}",
                s.ok_sym(),
                output::format_brl(Some(product.target_price - current))
            );
        } else if let Some(pct) = product.discount_to_target() {
            println!(
                "\n  Needs to drop {} ({pct}%) to reach the target.",
                output::format_brl(Some(current - product.target_price))
            );
        }
    }

    println!("\n  Created: {}", product.created_at.format("%Y-%m-%d %H:%M"));
    println!("  Updated: {}", product.updated_at.format("%Y-%m-%d %H:%M"));

    Ok(())
}
