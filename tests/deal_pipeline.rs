//! History → statistics → deal classification, end to end over the store.

use chrono::{Duration, Utc};
use pricewatch::config::{PriceRange, Settings};
use pricewatch::db::models::Product;
use pricewatch::db::Database;
use pricewatch::monitor;
use pricewatch::stores::Store;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn settings() -> Settings {
    Settings {
        delay_min_ms: 0,
        delay_max_ms: 0,
        timeout_ms: 5_000,
        blocked_backoff_ms: 0,
        blocked_retries: 1,
        price_range: PriceRange::default(),
        stats_windows: vec![7, 30],
        db_path: std::path::PathBuf::from(":memory:"),
    }
}

/// Seed a product with a daily price history and a final current price.
fn seed_product(db: &Database, sku: &str, history: &[&str], current: &str) -> Product {
    let now = Utc::now();
    let product = db
        .insert_product(
            Store::Carrefour,
            sku,
            &format!("https://mercado.carrefour.com.br/produto-{sku}/p"),
            Some(&format!("Produto {sku}")),
            None,
            dec("1"),
            None,
            now,
        )
        .unwrap();

    for (i, price) in history.iter().enumerate() {
        let at = now - Duration::days((history.len() - i) as i64);
        db.record_observation(product.id, dec(price), true, at).unwrap();
    }
    db.apply_price(product.id, dec(current), now).unwrap();
    db.record_observation(product.id, dec(current), true, now).unwrap();

    db.product_by_id(product.id).unwrap().unwrap()
}

#[test]
fn stable_price_yields_no_deals() {
    let db = Database::open_in_memory().unwrap();
    seed_product(&db, "1", &["10.00", "10.00", "10.00", "10.00"], "10.00");

    let ranked = monitor::best_deals(&db, &settings(), Utc::now()).unwrap();
    assert!(ranked.is_empty());
}

#[test]
fn sharp_drop_is_an_exceptional_deal() {
    let db = Database::open_in_memory().unwrap();
    let product = seed_product(
        &db,
        "1",
        &["12.00", "12.10", "11.90", "12.00", "12.05", "11.95"],
        "8.00",
    );

    let ranked = monitor::best_deals(&db, &settings(), Utc::now()).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].product_id, product.id);
    assert_eq!(ranked[0].sigma, 2);
    assert!(ranked[0].margin > Decimal::ZERO);
    assert_eq!(ranked[0].current_price, dec("8.00"));
}

#[test]
fn best_deals_ranks_by_margin_and_dedupes_by_product() {
    let db = Database::open_in_memory().unwrap();
    // Deep drop: large margin.
    let deep = seed_product(
        &db,
        "1",
        &["50.00", "50.20", "49.80", "50.10", "49.90"],
        "30.00",
    );
    // Shallower drop on the same scale: smaller margin.
    let shallow = seed_product(
        &db,
        "2",
        &["50.00", "50.20", "49.80", "50.10", "49.90"],
        "44.00",
    );
    // No drop at all.
    seed_product(&db, "3", &["50.00", "50.20", "49.80", "50.10", "49.90"], "50.00");

    let ranked = monitor::best_deals(&db, &settings(), Utc::now()).unwrap();

    // One entry per qualifying product even though both 7d and 30d windows
    // classify them.
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].product_id, deep.id);
    assert_eq!(ranked[1].product_id, shallow.id);
    assert!(ranked[0].margin > ranked[1].margin);

    let ids: Vec<i64> = ranked.iter().map(|d| d.product_id).collect();
    let mut deduped = ids.clone();
    deduped.dedup();
    assert_eq!(ids, deduped, "no product appears twice");
}

#[test]
fn single_sample_windows_classify_nothing() {
    let db = Database::open_in_memory().unwrap();
    // Only the current price exists: every window has 1 sample.
    seed_product(&db, "1", &[], "9.99");

    let ranked = monitor::best_deals(&db, &settings(), Utc::now()).unwrap();
    assert!(ranked.is_empty());
}
