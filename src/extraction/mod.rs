//! Multi-strategy field extraction over parsed product pages.
//!
//! For each (store, field) pair an ordered chain of independent strategies
//! is tried until one yields a value that passes the field's validity
//! predicate:
//!
//! 1. structured CSS selectors (most specific first, from the store's
//!    [`profiles::SiteProfile`]);
//! 2. embedded JSON-LD product/offer blocks ([`structured`]);
//! 3. inline script-state regex scraping ([`script_state`]);
//! 4. store-specific buy-box heuristics ([`buybox`], Amazon price only).
//!
//! Each strategy returns `Option` — "not found" never raises, and the first
//! accepted value short-circuits the rest of the chain. A field with no
//! accepted value is simply absent from the result; whether that makes the
//! whole scrape a failure is the orchestrator's call, not ours.
//!
//! The catalog-API fallback for the price field needs the network and
//! therefore lives with the orchestrator (`scrape::api`), not here — this
//! module is pure over the fetched page.

pub mod buybox;
pub mod profiles;
pub mod script_state;
pub mod structured;

use crate::config::PriceRange;
use crate::normalize;
use crate::stores::Store;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

/// Everything the chains recovered from one product page.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// Run every field chain for a store against raw page HTML.
pub fn extract_product(store: Store, raw_html: &str, range: &PriceRange) -> ExtractedFields {
    let document = Html::parse_document(raw_html);
    let profile = profiles::profile(store);

    // JSON-LD is parsed once and shared by the title/price/image chains.
    let jsonld = structured::extract_product(&document);

    let title = select_first_text(&document, profile.title_selectors, |t| t.len() > 3)
        .or_else(|| jsonld.as_ref().and_then(|p| p.name.clone()));

    let price = match store {
        Store::Amazon => buybox::price_from_one_time_label(&document)
            .or_else(|| select_price(&document, profile.price_selectors))
            .or_else(|| buybox::price_from_whole_fraction(&document))
            .or_else(|| buybox::price_from_buybox_candidates(&document))
            .or_else(|| jsonld.as_ref().and_then(|p| p.price)),
        Store::Carrefour | Store::Zaffari => select_price(&document, profile.price_selectors)
            .or_else(|| jsonld.as_ref().and_then(|p| p.price))
            .or_else(|| script_state::extract_price(raw_html, profile.script_state_patterns, range)),
    };

    let original_price = select_price(&document, profile.original_price_selectors);

    let image_url = select_first_attr(
        &document,
        profile.image_selectors,
        &["src", "data-src", "data-old-hires"],
    )
    .or_else(|| jsonld.as_ref().and_then(|p| p.image.clone()));

    let is_available = availability(&document, profile, price.is_some(), jsonld.as_ref());

    ExtractedFields {
        title,
        price,
        original_price,
        image_url,
        is_available,
    }
}

/// First selector whose text content passes the predicate.
fn select_first_text(
    document: &Html,
    selectors: &[&str],
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    for selector_str in selectors {
        let sel = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = document.select(&sel).next() {
            let text = element_text(&el);
            if !text.is_empty() && accept(&text) {
                return Some(text);
            }
        }
    }
    None
}

/// First selector whose text normalizes to a positive price.
fn select_price(document: &Html, selectors: &[&str]) -> Option<Decimal> {
    for selector_str in selectors {
        let sel = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = document.select(&sel).next() {
            if let Some(price) = normalize::parse_price_text(&element_text(&el)) {
                if price > Decimal::ZERO {
                    return Some(price);
                }
            }
        }
    }
    None
}

/// First selector carrying any of the given attributes.
fn select_first_attr(document: &Html, selectors: &[&str], attrs: &[&str]) -> Option<String> {
    for selector_str in selectors {
        let sel = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = document.select(&sel).next() {
            for attr in attrs {
                if let Some(value) = el.value().attr(attr) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Availability: an unavailable marker element flips it outright; the
/// page-text phrases and a schema.org OutOfStock signal only count when no
/// price was extracted (pages keep stale "esgotado" strings around).
fn availability(
    document: &Html,
    profile: &profiles::SiteProfile,
    has_price: bool,
    jsonld: Option<&structured::JsonLdProduct>,
) -> bool {
    for selector_str in profile.unavailable_selectors {
        if let Ok(sel) = Selector::parse(selector_str) {
            if document.select(&sel).next().is_some() {
                return false;
            }
        }
    }

    if !has_price {
        let body_text = body_text(document).to_lowercase();
        if profile
            .unavailable_phrases
            .iter()
            .any(|p| body_text.contains(p))
        {
            return false;
        }
        if let Some(availability) = jsonld.and_then(|p| p.availability.as_deref()) {
            let lower = availability.to_lowercase();
            if lower.contains("outofstock") || lower.contains("out_of_stock") {
                return false;
            }
        }
    }

    true
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn body_text(document: &Html) -> String {
    let sel = Selector::parse("body").expect("valid selector");
    document
        .select(&sel)
        .next()
        .map(|body| element_text(&body))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> PriceRange {
        PriceRange {
            min: "0.10".parse().unwrap(),
            max: "50000".parse().unwrap(),
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_zaffari_selector_chain() {
        let html = r#"
        <html><body>
            <h1 class="productName">Presunto Cozido Fatiado 180g</h1>
            <span class="zaffarilab-zaffari-produto-1-x-ProductPriceSellingPriceValue">R$ 12,79</span>
            <span class="vtex-product-price-1-x-listPrice">R$ 15,90</span>
            <div class="vtex-store-components-3-x-productImage">
                <img src="https://img.example/p.jpg" />
            </div>
        </body></html>
        "#;

        let fields = extract_product(Store::Zaffari, html, &range());
        assert_eq!(fields.title.as_deref(), Some("Presunto Cozido Fatiado 180g"));
        assert_eq!(fields.price, Some(dec("12.79")));
        assert_eq!(fields.original_price, Some(dec("15.90")));
        assert_eq!(fields.image_url.as_deref(), Some("https://img.example/p.jpg"));
        assert!(fields.is_available);
    }

    #[test]
    fn test_selector_outranks_jsonld() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "offers": {"price": 99.99}}
        </script>
        </head><body>
            <span class="skuBestPrice">R$ 39,60</span>
        </body></html>
        "#;

        let fields = extract_product(Store::Zaffari, html, &range());
        assert_eq!(fields.price, Some(dec("39.60")));
    }

    #[test]
    fn test_jsonld_fallback_when_selectors_miss() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "name": "Café em Pó 500g", "offers": {"price": 18.75}}
        </script>
        </head><body><div>nothing structured here</div></body></html>
        "#;

        let fields = extract_product(Store::Carrefour, html, &range());
        assert_eq!(fields.price, Some(dec("18.75")));
        assert_eq!(fields.title.as_deref(), Some("Café em Pó 500g"));
    }

    #[test]
    fn test_script_state_last_resort() {
        let html = r#"
        <html><body>
            <script>window.__STATE__ = {"product":{"sellingPrice":11.19}}</script>
        </body></html>
        "#;

        let fields = extract_product(Store::Carrefour, html, &range());
        assert_eq!(fields.price, Some(dec("11.19")));
    }

    #[test]
    fn test_all_strategies_miss_leaves_field_absent() {
        let html = "<html><body><h1>Produto Sem Preço</h1></body></html>";
        let fields = extract_product(Store::Zaffari, html, &range());
        assert_eq!(fields.title.as_deref(), Some("Produto Sem Preço"));
        assert_eq!(fields.price, None);
    }

    #[test]
    fn test_short_title_rejected() {
        let html = "<html><body><h1>abc</h1></body></html>";
        let fields = extract_product(Store::Zaffari, html, &range());
        assert_eq!(fields.title, None);
    }

    #[test]
    fn test_unavailable_marker_element() {
        let html = r#"
        <html><body>
            <h1 class="productName">Produto Fora de Linha</h1>
            <div class="vtex-store-components-3-x-unavailableContainer"></div>
        </body></html>
        "#;
        let fields = extract_product(Store::Zaffari, html, &range());
        assert!(!fields.is_available);
    }

    #[test]
    fn test_unavailable_phrase_only_without_price() {
        // Phrase plus a price: the stale marker loses.
        let html = r#"
        <html><body>
            <span class="skuBestPrice">R$ 9,90</span>
            <p>outros tamanhos: esgotado</p>
        </body></html>
        "#;
        let fields = extract_product(Store::Carrefour, html, &range());
        assert!(fields.is_available);

        // Phrase and no price: unavailable.
        let html = r#"<html><body><p>Produto indisponível</p></body></html>"#;
        let fields = extract_product(Store::Carrefour, html, &range());
        assert!(!fields.is_available);
    }

    #[test]
    fn test_amazon_price_chain() {
        let html = r#"
        <html><body>
            <div id="corePriceDisplay_desktop_feature_div">
                <span class="priceToPay"><span class="a-offscreen">R$ 149,90</span></span>
            </div>
            <span id="productTitle">Cafeteira Elétrica 110v</span>
        </body></html>
        "#;
        let fields = extract_product(Store::Amazon, html, &range());
        assert_eq!(fields.title.as_deref(), Some("Cafeteira Elétrica 110v"));
        assert_eq!(fields.price, Some(dec("149.90")));
    }

    #[test]
    fn test_amazon_subscription_page_prefers_one_time_price() {
        let html = r#"
        <html><body>
            <span id="productTitle">Ração Premium 10kg</span>
            <div id="buybox">
                <div class="option">
                    <label>Assinatura</label>
                    <span class="a-price"><span class="a-offscreen">R$ 112,41</span></span>
                </div>
                <div class="option">
                    <label>Compra única</label>
                    <span class="a-price"><span class="a-offscreen">R$ 124,90</span></span>
                </div>
            </div>
        </body></html>
        "#;
        let fields = extract_product(Store::Amazon, html, &range());
        assert_eq!(fields.price, Some(dec("124.90")));
    }

    #[test]
    fn test_amazon_whole_fraction_fallback() {
        let html = r#"
        <html><body>
            <div class="priceToPay">
                <span class="a-price-whole">89</span>
                <span class="a-price-fraction">90</span>
            </div>
        </body></html>
        "#;
        let fields = extract_product(Store::Amazon, html, &range());
        assert_eq!(fields.price, Some(dec("89.90")));
    }

    #[test]
    fn test_empty_page() {
        let fields = extract_product(Store::Carrefour, "", &range());
        assert_eq!(fields.title, None);
        assert_eq!(fields.price, None);
        assert!(fields.is_available);
    }
}
