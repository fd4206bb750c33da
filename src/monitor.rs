//! Product monitoring service: add, batch update, alerts, deal sweep.
//!
//! Batch semantics are partial-failure: every item is attempted, successes
//! and failures are collected separately, and one item can never abort the
//! run. A blocked response gets one backoff-and-retry; a second block is a
//! terminal failure for that item only.

use crate::config::Settings;
use crate::db::models::{Alert, AlertKind, Product};
use crate::db::Database;
use crate::deals::{self, DealClassification};
use crate::scrape::{ScrapedProduct, Scraper};
use crate::stats;
use crate::stores::Store;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, warn};

/// Per-item failure collected during a batch update.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub product_id: i64,
    pub label: String,
    pub error: String,
}

/// Outcome of one batch update run.
#[derive(Debug, Default)]
pub struct UpdateSummary {
    pub updated: Vec<Product>,
    pub failures: Vec<ItemFailure>,
}

/// Register a scraped product for monitoring.
///
/// A record with neither title nor price is rejected. Re-adding an existing
/// (store, sku) updates the target and reactivates monitoring instead of
/// duplicating the row.
pub fn add_product(
    db: &Database,
    scraped: &ScrapedProduct,
    store: Store,
    target_price: Decimal,
    now: DateTime<Utc>,
) -> Result<Product> {
    if scraped.is_total_failure() {
        bail!(
            "failed to scrape product: {}",
            scraped.error.as_deref().unwrap_or("no data extracted")
        );
    }

    if let Some(existing) = db.product_by_sku(store, &scraped.sku)? {
        info!(id = existing.id, "product already monitored, updating target");
        db.set_target(existing.id, target_price, now)?;
        return db
            .product_by_id(existing.id)?
            .context("existing product vanished");
    }

    let product = db.insert_product(
        store,
        &scraped.sku,
        &scraped.url,
        scraped.title.as_deref(),
        scraped.image_url.as_deref(),
        target_price,
        scraped.price,
        now,
    )?;

    if let Some(price) = scraped.price {
        db.record_observation(product.id, price, scraped.is_available, now)?;
    }
    db.create_alert(product.id, AlertKind::TargetReached, now)?;

    Ok(product)
}

/// Scrape every active product in sequence and fold accepted prices into
/// the store. Runs to completion over all items.
pub async fn update_all_prices(
    db: &Database,
    scraper: &mut Scraper,
    settings: &Settings,
) -> Result<UpdateSummary> {
    let products = db.products(true)?;
    let mut summary = UpdateSummary::default();

    for (i, product) in products.iter().enumerate() {
        info!(
            "updating {}/{}: {}",
            i + 1,
            products.len(),
            product_label(product)
        );

        let attempt = scrape_with_blocked_retry(scraper, &product.url, settings).await;

        match attempt.price {
            Some(price) => {
                let now = Utc::now();
                db.apply_price(product.id, price, now)?;
                db.record_observation(product.id, price, attempt.is_available, now)?;
                summary.updated.push(
                    db.product_by_id(product.id)?
                        .context("updated product vanished")?,
                );
            }
            None => {
                let error = attempt
                    .error
                    .unwrap_or_else(|| "no price extracted".to_string());
                warn!(id = product.id, error = %error, "price update failed");
                summary.failures.push(ItemFailure {
                    product_id: product.id,
                    label: product_label(product),
                    error,
                });
            }
        }
    }

    Ok(summary)
}

/// One scrape with the blocked-specific retry policy: on a blocked
/// response, wait the configured backoff and try again, up to the
/// configured retry count. Any other outcome is returned as-is.
async fn scrape_with_blocked_retry(
    scraper: &mut Scraper,
    url: &str,
    settings: &Settings,
) -> ScrapedProduct {
    let mut attempt = scraper.scrape(url).await;
    let mut retries = 0;
    while attempt.is_blocked() && retries < settings.blocked_retries {
        retries += 1;
        warn!(url, retries, "blocked; backing off before retry");
        tokio::time::sleep(Duration::from_millis(settings.blocked_backoff_ms)).await;
        attempt = scraper.scrape(url).await;
    }
    attempt
}

/// A newly fired target alert.
#[derive(Debug, Clone)]
pub struct TriggeredAlert {
    pub alert: Alert,
    pub product: Product,
    pub triggered_price: Decimal,
}

/// Fire untriggered target-reached alerts for products at or below target.
pub fn check_alerts(db: &Database, products: &[Product]) -> Result<Vec<TriggeredAlert>> {
    let mut fired = Vec::new();

    for product in products {
        let Some(current) = product.current_price else {
            continue;
        };
        if current > product.target_price {
            continue;
        }
        for alert in db.alerts_for_product(product.id)? {
            if alert.is_triggered || alert.kind != AlertKind::TargetReached {
                continue;
            }
            let now = Utc::now();
            db.trigger_alert(alert.id, current, now)?;
            fired.push(TriggeredAlert {
                alert,
                product: product.clone(),
                triggered_price: current,
            });
        }
    }

    Ok(fired)
}

/// Classify every active product against the configured windows at the
/// given sigma level. Feeds both the `deals` ranking (σ=2) and the `check`
/// summary (σ=1).
pub fn deal_candidates(
    db: &Database,
    windows: &[u32],
    sigma: u32,
    now: DateTime<Utc>,
) -> Result<Vec<DealClassification>> {
    let max_window = windows.iter().copied().max().unwrap_or(0);
    let mut candidates = Vec::new();

    for product in db.products(true)? {
        let Some(current) = product.current_price else {
            continue;
        };
        let history = db.history(product.id, max_window, now)?;
        for &window in windows {
            // Fewer than 2 samples in the window: no classification possible.
            let Some(stats) = stats::compute(&history, window, now) else {
                continue;
            };
            if let Some(deal) = deals::classify(product.id, current, &stats, sigma) {
                candidates.push(deal);
            }
        }
    }

    Ok(candidates)
}

/// The ranked best-deals view: 2σ hits across all windows, deduplicated by
/// product on maximum margin.
pub fn best_deals(db: &Database, settings: &Settings, now: DateTime<Utc>) -> Result<Vec<DealClassification>> {
    let candidates = deal_candidates(db, &settings.stats_windows, 2, now)?;
    Ok(deals::best_deals(candidates))
}

fn product_label(product: &Product) -> String {
    product
        .title
        .clone()
        .unwrap_or_else(|| format!("{}:{}", product.store.as_str(), product.sku))
}
