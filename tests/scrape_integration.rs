//! End-to-end scrape tests against a local fixture server.
//!
//! The scraper's fetch base is pointed at wiremock so real store URLs
//! classify normally while every request lands on the fixture.

use chrono::Utc;
use pricewatch::config::{PriceRange, Settings};
use pricewatch::db::Database;
use pricewatch::monitor;
use pricewatch::scrape::{ScrapeConfig, ScrapeOutcome, Scraper};
use pricewatch::stores::Store;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn fixture_scraper(server: &MockServer) -> Scraper {
    Scraper::with_rng(
        ScrapeConfig::for_fixture(&server.uri(), PriceRange::default()),
        StdRng::seed_from_u64(42),
    )
}

fn fixture_settings() -> Settings {
    Settings {
        delay_min_ms: 0,
        delay_max_ms: 0,
        timeout_ms: 5_000,
        blocked_backoff_ms: 10,
        blocked_retries: 1,
        price_range: PriceRange::default(),
        stats_windows: vec![7, 30],
        db_path: std::path::PathBuf::from(":memory:"),
    }
}

const ZAFFARI_PAGE: &str = r#"
<html><body>
    <h1 class="productName">Queijo Mussarela Fatiado President 150g</h1>
    <span class="zaffarilab-zaffari-produto-1-x-ProductPriceSellingPriceValue">R$ 11,19</span>
    <span class="vtex-product-price-1-x-listPrice">R$ 13,90</span>
</body></html>
"#;

#[tokio::test]
async fn scrape_returns_exact_selector_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/queijo-mussarela-fatiado-president-150g-1008729/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ZAFFARI_PAGE))
        .mount(&server)
        .await;

    let mut scraper = fixture_scraper(&server);
    let result = scraper
        .scrape("https://www.zaffari.com.br/queijo-mussarela-fatiado-president-150g-1008729/p")
        .await;

    assert_eq!(result.outcome, ScrapeOutcome::Success);
    assert_eq!(result.error, None);
    assert_eq!(result.sku, "1008729");
    assert_eq!(result.price, Some(dec("11.19")));
    assert_eq!(result.original_price, Some(dec("13.90")));
    assert_eq!(
        result.title.as_deref(),
        Some("Queijo Mussarela Fatiado President 150g")
    );
    assert!(result.is_available);
}

#[tokio::test]
async fn scrape_falls_back_to_jsonld() {
    let page = r#"
    <html><head>
    <script type="application/ld+json">
    {"@type": "Product", "name": "Leite UHT Integral 1L",
     "offers": {"price": "4.99", "availability": "https://schema.org/InStock"}}
    </script>
    </head><body><div>rendered client-side</div></body></html>
    "#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leite-uht-integral-1l-5551234/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let mut scraper = fixture_scraper(&server);
    let result = scraper
        .scrape("https://mercado.carrefour.com.br/leite-uht-integral-1l-5551234/p")
        .await;

    assert_eq!(result.outcome, ScrapeOutcome::Success);
    assert_eq!(result.price, Some(dec("4.99")));
}

#[tokio::test]
async fn scrape_recovers_price_via_catalog_api() {
    // Page with no extractable price signal at all.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agua-de-coco-integral-dikoko-caixa-1l-3006379/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/catalog_system/pub/products/search"))
        .and(query_param("fq", "productId:3006379"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "productName": "Água de Coco Integral Dikoko Caixa 1L",
            "items": [{"sellers": [{"commertialOffer": {"Price": 11.19}}]}]
        }])))
        .mount(&server)
        .await;

    let mut scraper = fixture_scraper(&server);
    let result = scraper
        .scrape("https://mercado.carrefour.com.br/agua-de-coco-integral-dikoko-caixa-1l-3006379/p")
        .await;

    assert_eq!(result.outcome, ScrapeOutcome::Success);
    assert_eq!(result.price, Some(dec("11.19")));
    // Title came from the URL slug before the API could supply one.
    assert!(result.title.is_some());
}

#[tokio::test]
async fn scrape_classifies_blocked_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dp/B0BTXDTD6H"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut scraper = fixture_scraper(&server);
    let result = scraper.scrape("https://www.amazon.com.br/dp/B0BTXDTD6H").await;

    assert_eq!(result.outcome, ScrapeOutcome::Blocked);
    assert!(result.is_blocked());
    assert!(result.error.as_deref().unwrap_or("").contains("503"));
    assert!(result.is_total_failure());
}

#[tokio::test]
async fn scrape_partial_when_title_but_no_price() {
    let page = r#"<html><body><h1 class="productName">Produto Sem Preço Publicado</h1></body></html>"#;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/produto-sem-preco-7777777/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let mut scraper = fixture_scraper(&server);
    let result = scraper
        .scrape("https://www.zaffari.com.br/produto-sem-preco-7777777/p")
        .await;

    assert_eq!(result.outcome, ScrapeOutcome::Partial);
    assert!(result.title.is_some());
    assert_eq!(result.price, None);
    assert!(result.error.is_some());
    assert!(!result.is_total_failure());
}

#[tokio::test]
async fn blocked_item_is_retried_once_then_terminal_without_aborting_batch() {
    let server = MockServer::start().await;

    // Blocked item: 503 on every attempt. Initial try + exactly one retry.
    Mock::given(method("GET"))
        .and(path("/produto-bloqueado-111111/p"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    // Healthy item keeps working.
    Mock::given(method("GET"))
        .and(path("/queijo-mussarela-fatiado-president-150g-222222/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ZAFFARI_PAGE))
        .mount(&server)
        .await;

    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();
    let blocked = db
        .insert_product(
            Store::Zaffari,
            "111111",
            "https://www.zaffari.com.br/produto-bloqueado-111111/p",
            Some("Produto Bloqueado"),
            None,
            dec("10"),
            None,
            now,
        )
        .unwrap();
    let healthy = db
        .insert_product(
            Store::Zaffari,
            "222222",
            "https://www.zaffari.com.br/queijo-mussarela-fatiado-president-150g-222222/p",
            Some("Queijo Mussarela"),
            None,
            dec("10"),
            None,
            now,
        )
        .unwrap();

    let settings = fixture_settings();
    let mut scraper = fixture_scraper(&server);
    let summary = monitor::update_all_prices(&db, &mut scraper, &settings)
        .await
        .unwrap();

    // The batch ran to completion: one success, one terminal failure.
    assert_eq!(summary.updated.len(), 1);
    assert_eq!(summary.updated[0].id, healthy.id);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].product_id, blocked.id);
    assert!(summary.failures[0].error.contains("blocked"));

    // The healthy product's price landed in the store and the history log.
    let refreshed = db.product_by_id(healthy.id).unwrap().unwrap();
    assert_eq!(refreshed.current_price, Some(dec("11.19")));
    assert_eq!(db.history(healthy.id, 30, Utc::now()).unwrap().len(), 1);

    // The blocked product is untouched.
    let still_blocked = db.product_by_id(blocked.id).unwrap().unwrap();
    assert_eq!(still_blocked.current_price, None);

    // MockServer::expect(2) verifies the retry count on drop.
}

#[tokio::test]
async fn scrape_many_yields_a_result_per_url_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/queijo-mussarela-fatiado-president-150g-1008729/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ZAFFARI_PAGE))
        .mount(&server)
        .await;

    let urls = vec![
        "https://www.zaffari.com.br/queijo-mussarela-fatiado-president-150g-1008729/p".to_string(),
        "https://example.com/not-a-store".to_string(),
    ];

    let mut scraper = fixture_scraper(&server);
    let results = scraper.scrape_many(&urls).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].outcome, ScrapeOutcome::Success);
    assert_eq!(results[1].outcome, ScrapeOutcome::UnrecognizedUrl);
}

#[tokio::test]
async fn add_product_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/queijo-mussarela-fatiado-president-150g-1008729/p"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ZAFFARI_PAGE))
        .mount(&server)
        .await;

    let db = Database::open_in_memory().unwrap();
    let mut scraper = fixture_scraper(&server);
    let url = "https://www.zaffari.com.br/queijo-mussarela-fatiado-president-150g-1008729/p";

    let scraped = scraper.scrape(url).await;
    let store = Store::classify(url).unwrap();
    let product = monitor::add_product(&db, &scraped, store, dec("9.50"), Utc::now()).unwrap();

    assert_eq!(product.store, Store::Zaffari);
    assert_eq!(product.current_price, Some(dec("11.19")));
    assert_eq!(product.lowest_price, Some(dec("11.19")));
    assert_eq!(db.history(product.id, 30, Utc::now()).unwrap().len(), 1);
    assert_eq!(db.alerts_for_product(product.id).unwrap().len(), 1);
}
