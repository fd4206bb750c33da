//! Persisted data models.

use crate::stores::Store;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A monitored product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub store: Store,
    pub url: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub target_price: Decimal,
    pub current_price: Option<Decimal>,
    pub lowest_price: Option<Decimal>,
    pub highest_price: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Price status relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    Unknown,
    TargetReached,
    Monitoring,
}

impl Product {
    pub fn price_status(&self) -> PriceStatus {
        match self.current_price {
            None => PriceStatus::Unknown,
            Some(current) if current <= self.target_price => PriceStatus::TargetReached,
            Some(_) => PriceStatus::Monitoring,
        }
    }

    /// Percentage the price still has to drop to reach the target.
    pub fn discount_to_target(&self) -> Option<Decimal> {
        let current = self.current_price?;
        if current <= Decimal::ZERO {
            return None;
        }
        Some(((current - self.target_price) / current * Decimal::from(100)).round_dp(1))
    }
}

/// One historical price sample. Append-only: rows are never mutated, and
/// they disappear only when the whole product is deleted.
#[derive(Debug, Clone, Serialize)]
pub struct PriceObservation {
    pub id: i64,
    pub product_id: i64,
    pub price: Decimal,
    pub was_available: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Running lowest/highest price pair for a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub lowest: Option<Decimal>,
    pub highest: Option<Decimal>,
}

/// Fold one accepted price into the running bounds. Pure: called by the
/// persistence boundary, never from extraction code.
pub fn update_bounds(bounds: PriceBounds, price: Decimal) -> PriceBounds {
    PriceBounds {
        lowest: Some(bounds.lowest.map_or(price, |low| low.min(price))),
        highest: Some(bounds.highest.map_or(price, |high| high.max(price))),
    }
}

/// Kinds of price alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TargetReached,
    PriceDrop,
    BelowAverage,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::TargetReached => "target_reached",
            AlertKind::PriceDrop => "price_drop",
            AlertKind::BelowAverage => "below_average",
        }
    }

    pub fn from_str(s: &str) -> Option<AlertKind> {
        match s {
            "target_reached" => Some(AlertKind::TargetReached),
            "price_drop" => Some(AlertKind::PriceDrop),
            "below_average" => Some(AlertKind::BelowAverage),
            _ => None,
        }
    }
}

/// A price alert attached to a product.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: i64,
    pub product_id: i64,
    pub kind: AlertKind,
    pub is_triggered: bool,
    pub triggered_price: Option<Decimal>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
