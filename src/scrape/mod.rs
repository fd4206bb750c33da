//! Scrape orchestrator.
//!
//! `scrape()` sequences one attempt: classify the URL (failing before any
//! network call for unrecognized shapes), wait a randomized courtesy delay,
//! fetch with a rotated user agent, run the per-field extraction chains and
//! assemble a [`ScrapedProduct`] tagged with an explicit outcome. Missing
//! fields are data, not errors — only the fetch stage produces hard
//! failures.
//!
//! Execution is strictly sequential: one request in flight at a time, with
//! an inter-request delay between batch items. That is deliberate
//! anti-blocking behavior, not a missing optimization.

pub mod api;
pub mod http;

use crate::config::{PriceRange, Settings, USER_AGENTS};
use crate::error::ScrapeError;
use crate::extraction;
use crate::stores::{self, Store};
use http::HttpClient;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Explicit outcome tag for one scrape attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeOutcome {
    /// Title and price both extracted.
    Success,
    /// One of title/price extracted — usable for display, not for tracking.
    Partial,
    /// Page fetched but neither title nor price found.
    Failed,
    /// Anti-bot rejection (HTTP 403/503). Batch callers retry with backoff.
    Blocked,
    /// Transport or non-blocked HTTP failure.
    Transport,
    /// URL did not classify or validate; no network call was made.
    UnrecognizedUrl,
}

/// Result of one scrape attempt. Consumed by the caller to update persisted
/// product state; never stored itself.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedProduct {
    pub sku: String,
    pub url: String,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub outcome: ScrapeOutcome,
    pub error: Option<String>,
}

impl ScrapedProduct {
    pub fn is_success(&self) -> bool {
        self.outcome == ScrapeOutcome::Success
    }

    pub fn is_blocked(&self) -> bool {
        self.outcome == ScrapeOutcome::Blocked
    }

    /// Total failure: error set with title and price both absent. Nothing
    /// usable came back.
    pub fn is_total_failure(&self) -> bool {
        self.error.is_some() && self.title.is_none() && self.price.is_none()
    }

    fn rejected(url: &str, outcome: ScrapeOutcome, error: String) -> Self {
        Self {
            sku: String::new(),
            url: url.to_string(),
            title: None,
            price: None,
            original_price: None,
            image_url: None,
            is_available: false,
            outcome,
            error: Some(error),
        }
    }
}

/// Orchestrator configuration, cut down from [`Settings`] to what a single
/// scrape needs.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub timeout_ms: u64,
    pub price_range: PriceRange,
    /// When set, the scheme and authority of every fetch (pages and catalog
    /// endpoints) are replaced with this base. Lets tests route the scraper
    /// at a local fixture server.
    pub fetch_base: Option<String>,
}

impl ScrapeConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            delay_min_ms: settings.delay_min_ms,
            delay_max_ms: settings.delay_max_ms,
            timeout_ms: settings.timeout_ms,
            price_range: settings.price_range,
            fetch_base: None,
        }
    }

    /// Zero-delay config pointed at a fixture server.
    pub fn for_fixture(base: &str, price_range: PriceRange) -> Self {
        Self {
            delay_min_ms: 0,
            delay_max_ms: 0,
            timeout_ms: 5_000,
            price_range,
            fetch_base: Some(base.to_string()),
        }
    }
}

pub struct Scraper {
    client: HttpClient,
    cfg: ScrapeConfig,
    rng: StdRng,
}

impl Scraper {
    pub fn new(cfg: ScrapeConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }

    /// Construct with an explicit RNG so delay draws and user-agent rotation
    /// are reproducible in tests.
    pub fn with_rng(cfg: ScrapeConfig, rng: StdRng) -> Self {
        let client = HttpClient::new(cfg.timeout_ms);
        Self { client, cfg, rng }
    }

    /// Scrape one product URL.
    pub async fn scrape(&mut self, url: &str) -> ScrapedProduct {
        let store = match Store::classify(url) {
            Ok(store) => store,
            Err(e) => {
                warn!(url, "unrecognized product URL");
                return ScrapedProduct::rejected(url, ScrapeOutcome::UnrecognizedUrl, e.to_string());
            }
        };

        if !store.validate_url(url) {
            let e = ScrapeError::InvalidUrl {
                store: store.display_name(),
                url: url.to_string(),
            };
            return ScrapedProduct::rejected(url, ScrapeOutcome::UnrecognizedUrl, e.to_string());
        }

        let sku = store
            .extract_sku(url)
            .unwrap_or_else(|| "unknown".to_string());
        let normalized = store.normalize_url(url);
        let url_title = match store {
            Store::Amazon => None,
            _ => stores::title_from_url(&normalized),
        };

        self.pause().await;

        let ua = self.pick_user_agent();
        let fetch_url = self.rewrite_url(&normalized);
        debug!(%store, %sku, url = %fetch_url, "fetching product page");

        let html = match self.client.fetch_page(&fetch_url, ua).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%store, %sku, error = %e, "fetch failed");
                let outcome = match &e {
                    ScrapeError::Blocked { .. } => ScrapeOutcome::Blocked,
                    _ => ScrapeOutcome::Transport,
                };
                return ScrapedProduct {
                    sku,
                    url: normalized,
                    title: url_title.clone(),
                    price: None,
                    original_price: None,
                    image_url: None,
                    is_available: url_title.is_some(),
                    outcome,
                    error: Some(e.to_string()),
                };
            }
        };

        let fields = extraction::extract_product(store, &html, &self.cfg.price_range);
        let mut product = ScrapedProduct {
            sku,
            url: normalized,
            title: fields.title.or(url_title),
            price: fields.price,
            original_price: fields.original_price,
            image_url: fields.image_url,
            is_available: fields.is_available,
            outcome: ScrapeOutcome::Success,
            error: None,
        };

        // Price still missing: catalog-API fallback for stores that have one.
        if product.price.is_none() {
            let ua = self.pick_user_agent();
            let base = self.cfg.fetch_base.clone();
            if let Some(found) =
                api::fetch_catalog_price(&self.client, store, &product.sku, base.as_deref(), ua)
                    .await
            {
                debug!(%store, sku = %product.sku, "price recovered via catalog API");
                product.price = Some(found.price);
                if product.title.is_none() {
                    product.title = found.title;
                }
            }
        }

        match (&product.title, &product.price) {
            (Some(_), Some(_)) => {}
            (Some(_), None) => {
                product.outcome = ScrapeOutcome::Partial;
                product.error =
                    Some("could not extract the price; the site may be blocking".to_string());
            }
            (None, Some(_)) => {
                product.outcome = ScrapeOutcome::Partial;
                product.error = Some(
                    "could not extract the title; the page structure may have changed".to_string(),
                );
            }
            (None, None) => {
                product.outcome = ScrapeOutcome::Failed;
                product.error = Some(
                    "could not extract product information; the page structure may have changed"
                        .to_string(),
                );
            }
        }

        product
    }

    /// Scrape several URLs in sequence with the inter-request delay between
    /// each. Never parallel, never short-circuits: every URL gets a result.
    pub async fn scrape_many(&mut self, urls: &[String]) -> Vec<ScrapedProduct> {
        let mut results = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            info!("scraping product {}/{}", i + 1, urls.len());
            results.push(self.scrape(url).await);
            if i + 1 < urls.len() {
                self.pause().await;
            }
        }
        results
    }

    /// Randomized courtesy delay between requests.
    async fn pause(&mut self) {
        let ms = if self.cfg.delay_max_ms > self.cfg.delay_min_ms {
            self.rng
                .gen_range(self.cfg.delay_min_ms..=self.cfg.delay_max_ms)
        } else {
            self.cfg.delay_min_ms
        };
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn pick_user_agent(&mut self) -> &'static str {
        USER_AGENTS[self.rng.gen_range(0..USER_AGENTS.len())]
    }

    /// Swap scheme and authority for the fixture base, when configured.
    fn rewrite_url(&self, url: &str) -> String {
        let Some(base) = &self.cfg.fetch_base else {
            return url.to_string();
        };
        match url::Url::parse(url) {
            Ok(parsed) => {
                let mut rewritten = format!("{}{}", base.trim_end_matches('/'), parsed.path());
                if let Some(q) = parsed.query() {
                    rewritten.push('?');
                    rewritten.push_str(q);
                }
                rewritten
            }
            Err(_) => url.to_string(),
        }
    }
}
