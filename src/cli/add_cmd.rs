//! `pricewatch add <url> <target_price>` — start monitoring a product.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use crate::monitor;
use crate::normalize;
use crate::scrape::{ScrapeConfig, Scraper};
use crate::stores::Store;
use anyhow::{bail, Result};
use chrono::Utc;
use rust_decimal::Decimal;

pub async fn run(settings: &Settings, url: &str, target_price: &str) -> Result<()> {
    let s = Styled::new();

    let Some(target) = normalize::parse_price_input(target_price) else {
        bail!(
            "could not parse price '{target_price}'. Use formats like 80,99 or 80.99 \
             (quote values containing R$ to keep the shell out of the way)"
        );
    };
    if target <= Decimal::ZERO {
        bail!("target price must be positive");
    }

    let store = Store::classify(url)?;

    if !output::is_quiet() && !output::is_json() {
        println!(
            "  Adding {} product with target {}...",
            store,
            output::format_brl(Some(target))
        );
    }

    let db = Database::open(&settings.db_path)?;
    let mut scraper = Scraper::new(ScrapeConfig::from_settings(settings));
    let scraped = scraper.scrape(url).await;
    let product = monitor::add_product(&db, &scraped, store, target, Utc::now())?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "product": product,
            "scrape_outcome": scraped.outcome,
            "scrape_error": scraped.error,
        }));
        return Ok(());
    }

    println!("\n  {} Product added", s.ok_sym());
    println!("  ID:      {}", product.id);
    println!("  Title:   {}", product.title.as_deref().unwrap_or("--"));
    println!("  SKU:     {}", product.sku);
    println!("  Current: {}", output::format_brl(product.current_price));
    println!("  Target:  {}", output::format_brl(Some(product.target_price)));

    if let Some(error) = &scraped.error {
        println!("  {} {}", s.warn_sym(), error);
    }

    match product.current_price {
        Some(current) if current <= product.target_price => {
            println!("\n  {} Already at or below your target price!", s.ok_sym());
        }
        Some(_) => {
            if let Some(pct) = product.discount_to_target() {
                println!("\n  Needs to drop {pct}% to reach the target.");
            }
        }
        None => {}
    }

    Ok(())
}
