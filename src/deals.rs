//! Deal classification against σ thresholds.
//!
//! A product qualifies at (window, sigma) when its current price sits at or
//! below `mean − sigma·σ` for that window — and σ must be strictly positive.
//! With a flat history both thresholds collapse onto the mean, and a price
//! exactly at the mean of an unchanging series is not a drop at all.
//!
//! 2σ membership implies 1σ membership; callers that want exclusive buckets
//! check 2σ first.

use crate::stats::PriceStatistics;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// One (product, window, sigma) qualification.
#[derive(Debug, Clone, Serialize)]
pub struct DealClassification {
    pub product_id: i64,
    pub window_days: u32,
    /// Sigma level: 1 = good deal, 2 = exceptional deal.
    pub sigma: u32,
    pub current_price: Decimal,
    pub threshold: Decimal,
    /// How far below the threshold the price sits. Non-negative by
    /// construction.
    pub margin: Decimal,
}

/// Does the current price qualify at this sigma level for the window?
pub fn qualifies(current: Decimal, stats: &PriceStatistics, sigma: u32) -> bool {
    if stats.std_dev() <= 0.0 {
        return false;
    }
    match current.to_f64() {
        Some(price) => price <= stats.threshold(sigma),
        None => false,
    }
}

/// Build the classification record for a qualifying price, `None` otherwise.
pub fn classify(
    product_id: i64,
    current: Decimal,
    stats: &PriceStatistics,
    sigma: u32,
) -> Option<DealClassification> {
    if !qualifies(current, stats, sigma) {
        return None;
    }
    let threshold = stats.threshold_display(sigma);
    Some(DealClassification {
        product_id,
        window_days: stats.window_days,
        sigma,
        current_price: current,
        threshold,
        margin: (threshold - current).max(Decimal::ZERO),
    })
}

/// Rank candidate classifications into the best-deals view: deduplicate by
/// product keeping the largest margin, sort descending by margin, ties
/// broken by product id for determinism.
pub fn best_deals(mut candidates: Vec<DealClassification>) -> Vec<DealClassification> {
    // Keep each product's best margin. Sorting product-first makes the dedup
    // a single pass.
    candidates.sort_by(|a, b| {
        a.product_id
            .cmp(&b.product_id)
            .then(b.margin.cmp(&a.margin))
    });
    candidates.dedup_by_key(|c| c.product_id);

    candidates.sort_by(|a, b| {
        b.margin
            .cmp(&a.margin)
            .then(a.product_id.cmp(&b.product_id))
    });
    candidates
}
