//! SQLite persistence for products, price history and alerts.
//!
//! The price history is an append-only log: one row per accepted scrape,
//! never mutated, removed only when its product is deleted (FK cascade).
//! Prices are stored as canonical decimal TEXT so nothing is lost to float
//! round-trips. Lowest/highest running bounds are folded in through the
//! pure [`models::update_bounds`] reducer at this boundary — extraction code
//! never touches them.

pub mod models;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use models::{update_bounds, Alert, AlertKind, PriceBounds, PriceObservation, Product};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;

use crate::stores::Store;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    sku TEXT NOT NULL,
    store TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    image_url TEXT,
    target_price TEXT NOT NULL,
    current_price TEXT,
    lowest_price TEXT,
    highest_price TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (store, sku)
);
CREATE TABLE IF NOT EXISTS price_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    price TEXT NOT NULL,
    was_available INTEGER NOT NULL DEFAULT 1,
    recorded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_price_history_product
    ON price_history(product_id, recorded_at);
CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    is_triggered INTEGER NOT NULL DEFAULT 0,
    triggered_price TEXT,
    triggered_at TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);
";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        Self::init(conn)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)
            .context("failed to create schema")?;
        Ok(Self { conn })
    }

    // ── Products ─────────────────────────────────────────────────────────

    /// Insert a new monitored product. The first accepted price seeds both
    /// running bounds.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_product(
        &self,
        store: Store,
        sku: &str,
        url: &str,
        title: Option<&str>,
        image_url: Option<&str>,
        target_price: Decimal,
        current_price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<Product> {
        let price_text = current_price.map(|p| p.to_string());
        self.conn.execute(
            "INSERT INTO products
                (sku, store, url, title, image_url, target_price,
                 current_price, lowest_price, highest_price, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7, ?8, ?8)",
            params![
                sku,
                store.as_str(),
                url,
                title,
                image_url,
                target_price.to_string(),
                price_text,
                now.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.product_by_id(id)?
            .context("inserted product not found")
    }

    pub fn product_by_id(&self, id: i64) -> Result<Option<Product>> {
        let mut stmt = self.conn.prepare("SELECT * FROM products WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], row_to_product)?;
        Ok(rows.next().transpose()?)
    }

    pub fn product_by_sku(&self, store: Store, sku: &str) -> Result<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM products WHERE store = ?1 AND sku = ?2")?;
        let mut rows = stmt.query_map(params![store.as_str(), sku], row_to_product)?;
        Ok(rows.next().transpose()?)
    }

    pub fn products(&self, active_only: bool) -> Result<Vec<Product>> {
        let sql = if active_only {
            "SELECT * FROM products WHERE is_active = 1 ORDER BY updated_at DESC"
        } else {
            "SELECT * FROM products ORDER BY updated_at DESC"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], row_to_product)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Products currently at or below their target, best savings first.
    pub fn products_at_target(&self) -> Result<Vec<Product>> {
        let all = self.products(true)?;
        let mut hit: Vec<Product> = all
            .into_iter()
            .filter(|p| matches!(p.current_price, Some(c) if c <= p.target_price))
            .collect();
        hit.sort_by(|a, b| {
            let savings = |p: &Product| p.target_price - p.current_price.unwrap_or_default();
            savings(b).cmp(&savings(a)).then(a.id.cmp(&b.id))
        });
        Ok(hit)
    }

    /// Update the target price and reactivate monitoring.
    pub fn set_target(&self, id: i64, target_price: Decimal, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE products SET target_price = ?1, is_active = 1, updated_at = ?2 WHERE id = ?3",
            params![target_price.to_string(), now.to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Fold an accepted price into current/lowest/highest.
    pub fn apply_price(&self, id: i64, price: Decimal, now: DateTime<Utc>) -> Result<()> {
        let product = self
            .product_by_id(id)?
            .with_context(|| format!("product {id} not found"))?;
        let bounds = update_bounds(
            PriceBounds {
                lowest: product.lowest_price,
                highest: product.highest_price,
            },
            price,
        );
        self.conn.execute(
            "UPDATE products
             SET current_price = ?1, lowest_price = ?2, highest_price = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                price.to_string(),
                bounds.lowest.map(|p| p.to_string()),
                bounds.highest.map(|p| p.to_string()),
                now.to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE products SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active as i64, now.to_rfc3339(), id],
        )?;
        Ok(())
    }

    /// Delete a product; history and alerts cascade.
    pub fn delete_product(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Price history ────────────────────────────────────────────────────

    /// Append one observation. One logical write per accepted scrape.
    pub fn record_observation(
        &self,
        product_id: i64,
        price: Decimal,
        was_available: bool,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO price_history (product_id, price, was_available, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                product_id,
                price.to_string(),
                was_available as i64,
                at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Observations for a product inside the trailing window, chronological.
    pub fn history(
        &self,
        product_id: i64,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PriceObservation>> {
        let cutoff = (now - chrono::Duration::days(days as i64)).to_rfc3339();
        let mut stmt = self.conn.prepare(
            "SELECT id, product_id, price, was_available, recorded_at
             FROM price_history
             WHERE product_id = ?1 AND recorded_at >= ?2
             ORDER BY recorded_at ASC",
        )?;
        let rows = stmt.query_map(params![product_id, cutoff], row_to_observation)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ── Alerts ───────────────────────────────────────────────────────────

    pub fn create_alert(
        &self,
        product_id: i64,
        kind: AlertKind,
        now: DateTime<Utc>,
    ) -> Result<Alert> {
        self.conn.execute(
            "INSERT INTO alerts (product_id, kind, created_at) VALUES (?1, ?2, ?3)",
            params![product_id, kind.as_str(), now.to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        let mut stmt = self.conn.prepare("SELECT * FROM alerts WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], row_to_alert)?;
        rows.next()
            .transpose()?
            .context("inserted alert not found")
    }

    pub fn alerts_for_product(&self, product_id: i64) -> Result<Vec<Alert>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM alerts WHERE product_id = ?1 AND is_active = 1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![product_id], row_to_alert)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn trigger_alert(&self, alert_id: i64, price: Decimal, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE alerts SET is_triggered = 1, triggered_price = ?1, triggered_at = ?2
             WHERE id = ?3",
            params![price.to_string(), now.to_rfc3339(), alert_id],
        )?;
        Ok(())
    }

    pub fn reset_alert(&self, alert_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE alerts
             SET is_triggered = 0, triggered_price = NULL, triggered_at = NULL
             WHERE id = ?1",
            params![alert_id],
        )?;
        Ok(())
    }

    /// Triggered alerts joined with their products, newest first.
    pub fn triggered_alerts(&self) -> Result<Vec<(Alert, Product)>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.id FROM alerts a
             JOIN products p ON p.id = a.product_id
             WHERE a.is_triggered = 1 AND a.is_active = 1
             ORDER BY a.triggered_at DESC",
        )?;
        let ids: Vec<i64> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let mut stmt = self.conn.prepare("SELECT * FROM alerts WHERE id = ?1")?;
            let alert = stmt
                .query_map(params![id], row_to_alert)?
                .next()
                .transpose()?
                .context("alert vanished mid-query")?;
            if let Some(product) = self.product_by_id(alert.product_id)? {
                out.push((alert, product));
            }
        }
        Ok(out)
    }
}

// ── Row mapping ──────────────────────────────────────────────────────────

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        sku: row.get("sku")?,
        store: parse_store(row, "store")?,
        url: row.get("url")?,
        title: row.get("title")?,
        image_url: row.get("image_url")?,
        target_price: parse_decimal(row, "target_price")?,
        current_price: parse_decimal_opt(row, "current_price")?,
        lowest_price: parse_decimal_opt(row, "lowest_price")?,
        highest_price: parse_decimal_opt(row, "highest_price")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: parse_timestamp(row, "created_at")?,
        updated_at: parse_timestamp(row, "updated_at")?,
    })
}

fn row_to_observation(row: &Row<'_>) -> rusqlite::Result<PriceObservation> {
    Ok(PriceObservation {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        price: parse_decimal(row, "price")?,
        was_available: row.get::<_, i64>("was_available")? != 0,
        recorded_at: parse_timestamp(row, "recorded_at")?,
    })
}

fn row_to_alert(row: &Row<'_>) -> rusqlite::Result<Alert> {
    let kind_text: String = row.get("kind")?;
    let kind = AlertKind::from_str(&kind_text).ok_or_else(|| {
        conversion_error(format!("unknown alert kind: {kind_text}"))
    })?;
    Ok(Alert {
        id: row.get("id")?,
        product_id: row.get("product_id")?,
        kind,
        is_triggered: row.get::<_, i64>("is_triggered")? != 0,
        triggered_price: parse_decimal_opt(row, "triggered_price")?,
        triggered_at: parse_timestamp_opt(row, "triggered_at")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: parse_timestamp(row, "created_at")?,
    })
}

fn parse_store(row: &Row<'_>, col: &str) -> rusqlite::Result<Store> {
    let text: String = row.get(col)?;
    Store::from_str(&text).ok_or_else(|| conversion_error(format!("unknown store: {text}")))
}

fn parse_decimal(row: &Row<'_>, col: &str) -> rusqlite::Result<Decimal> {
    let text: String = row.get(col)?;
    text.parse()
        .map_err(|e| conversion_error(format!("bad decimal in {col}: {e}")))
}

fn parse_decimal_opt(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<Decimal>> {
    let text: Option<String> = row.get(col)?;
    text.map(|t| {
        t.parse()
            .map_err(|e| conversion_error(format!("bad decimal in {col}: {e}")))
    })
    .transpose()
}

fn parse_timestamp(row: &Row<'_>, col: &str) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(col)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(format!("bad timestamp in {col}: {e}")))
}

fn parse_timestamp_opt(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(col)?;
    text.map(|t| {
        DateTime::parse_from_rfc3339(&t)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(format!("bad timestamp in {col}: {e}")))
    })
    .transpose()
}

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}
