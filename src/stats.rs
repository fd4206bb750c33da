//! Rolling price statistics over the observation history.
//!
//! Computes mean and **population** standard deviation (divide by n, not
//! n−1) of the samples inside a trailing window. Population variance is the
//! deliberate choice: with the small, irregular samples this domain
//! produces, the n−1 estimator lets one new observation swing the
//! thresholds erratically.
//!
//! Below 2 samples the statistics are absent — not zero, not an error.
//! Variance of a single point is undefined and callers must read absence as
//! "no classification possible", never as "no deal".

use crate::db::models::PriceObservation;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;

/// Derived statistics for one lookback window. Never persisted; recomputed
/// on demand from the observation log.
#[derive(Debug, Clone, Serialize)]
pub struct PriceStatistics {
    pub window_days: u32,
    pub samples: usize,
    mean: f64,
    std_dev: f64,
}

impl PriceStatistics {
    /// Unrounded mean, for threshold math.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unrounded population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Lower threshold at `sigma` standard deviations: mean − k·σ.
    /// Computed from the unrounded values.
    pub fn threshold(&self, sigma: u32) -> f64 {
        self.mean - sigma as f64 * self.std_dev
    }

    /// Mean rounded to currency precision, for presentation only.
    pub fn mean_display(&self) -> Decimal {
        Decimal::from_f64(self.mean)
            .unwrap_or_default()
            .round_dp(2)
    }

    /// Standard deviation rounded to currency precision.
    pub fn std_dev_display(&self) -> Decimal {
        Decimal::from_f64(self.std_dev)
            .unwrap_or_default()
            .round_dp(2)
    }

    pub fn threshold_display(&self, sigma: u32) -> Decimal {
        Decimal::from_f64(self.threshold(sigma))
            .unwrap_or_default()
            .round_dp(2)
    }
}

/// Compute statistics over the observations inside the trailing window.
///
/// Returns `None` when fewer than 2 samples fall inside the window.
/// Observations are assumed chronological but need not be evenly spaced.
pub fn compute(
    observations: &[PriceObservation],
    window_days: u32,
    now: DateTime<Utc>,
) -> Option<PriceStatistics> {
    let cutoff = now - Duration::days(window_days as i64);

    let prices: Vec<f64> = observations
        .iter()
        .filter(|obs| obs.recorded_at >= cutoff)
        .filter_map(|obs| obs.price.to_f64())
        .collect();

    if prices.len() < 2 {
        return None;
    }

    let n = prices.len() as f64;
    let mean = prices.iter().sum::<f64>() / n;
    let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    Some(PriceStatistics {
        window_days,
        samples: prices.len(),
        mean,
        std_dev,
    })
}
