//! Embedded structured data (JSON-LD) extraction.
//!
//! Parses `<script type="application/ld+json">` blocks defensively: a
//! malformed or truncated block is skipped, never a fatal error. Handles the
//! three shapes seen in the wild — a single object, a top-level array, and
//! an `@graph` wrapper — and offer prices given as numbers or strings.

use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::Value;

/// Product fields recovered from a JSON-LD Product block.
#[derive(Debug, Clone, Default)]
pub struct JsonLdProduct {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub availability: Option<String>,
}

/// Extract the first JSON-LD Product block from a parsed document.
pub fn extract_product(document: &Html) -> Option<JsonLdProduct> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    for element in document.select(&sel) {
        let text = element.inner_html();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Some(product) = find_product(&value) {
            return Some(product);
        }
    }

    None
}

/// Extract just the offer price from JSON-LD, if any block carries one.
pub fn extract_price(document: &Html) -> Option<Decimal> {
    extract_product(document).and_then(|p| p.price)
}

/// Walk a JSON-LD value (object, array or @graph) looking for a Product.
fn find_product(value: &Value) -> Option<JsonLdProduct> {
    match value {
        Value::Array(items) => items.iter().find_map(find_product),
        Value::Object(_) => {
            if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
                return graph.iter().find_map(find_product);
            }
            let ld_type = value.get("@type").and_then(|t| t.as_str()).unwrap_or("");
            if ld_type != "Product" && ld_type != "ProductGroup" {
                return None;
            }
            Some(parse_product(value))
        }
        _ => None,
    }
}

fn parse_product(v: &Value) -> JsonLdProduct {
    let offer = v.get("offers").and_then(|o| {
        if o.is_array() {
            o.as_array().and_then(|arr| arr.first())
        } else {
            Some(o)
        }
    });

    let (price, availability) = match offer {
        Some(offer) => (
            offer
                .get("price")
                .or_else(|| offer.get("lowPrice"))
                .and_then(decimal_value),
            offer
                .get("availability")
                .and_then(|a| a.as_str())
                .map(|s| s.to_string()),
        ),
        None => (None, None),
    };

    JsonLdProduct {
        name: v
            .get("name")
            .and_then(|n| n.as_str())
            .map(|s| s.to_string()),
        price,
        image: v.get("image").and_then(|i| {
            i.as_str()
                .or_else(|| i.as_array().and_then(|a| a.first()).and_then(|v| v.as_str()))
                .map(|s| s.to_string())
        }),
        availability,
    }
}

/// Read a JSON value as a decimal price: numbers and numeric strings both
/// appear in real offer blocks.
fn decimal_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(_) => v.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_product_block_with_numeric_price() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {
          "@type": "Product",
          "name": "Queijo Mussarela Fatiado 150g",
          "offers": {
            "@type": "Offer",
            "price": 11.19,
            "priceCurrency": "BRL",
            "availability": "https://schema.org/InStock"
          }
        }
        </script>
        </head><body></body></html>
        "#;

        let p = extract_product(&parse(html)).unwrap();
        assert_eq!(p.name.as_deref(), Some("Queijo Mussarela Fatiado 150g"));
        assert_eq!(p.price, Some("11.19".parse().unwrap()));
        assert_eq!(p.availability.as_deref(), Some("https://schema.org/InStock"));
    }

    #[test]
    fn test_string_price_and_low_price() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "name": "X", "offers": {"lowPrice": "39.60"}}
        </script>
        </head><body></body></html>
        "#;
        assert_eq!(extract_price(&parse(html)), Some("39.60".parse().unwrap()));
    }

    #[test]
    fn test_offers_array() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {"@type": "Product", "offers": [{"price": 5.49}, {"price": 7.99}]}
        </script>
        </head><body></body></html>
        "#;
        assert_eq!(extract_price(&parse(html)), Some("5.49".parse().unwrap()));
    }

    #[test]
    fn test_graph_wrapper() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@graph": [
            {"@type": "WebSite", "name": "Loja"},
            {"@type": "Product", "name": "Arroz 5kg", "offers": {"price": 24.90}}
          ]
        }
        </script>
        </head><body></body></html>
        "#;
        let p = extract_product(&parse(html)).unwrap();
        assert_eq!(p.name.as_deref(), Some("Arroz 5kg"));
        assert_eq!(p.price, Some("24.90".parse().unwrap()));
    }

    #[test]
    fn test_top_level_array() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">
        [{"@type": "BreadcrumbList"}, {"@type": "Product", "offers": {"price": 3.15}}]
        </script>
        </head><body></body></html>
        "#;
        assert_eq!(extract_price(&parse(html)), Some("3.15".parse().unwrap()));
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let html = r#"
        <html><head>
        <script type="application/ld+json">{not valid json}</script>
        <script type="application/ld+json">
        {"@type": "Product", "offers": {"price": 9.90}}
        </script>
        </head><body></body></html>
        "#;
        assert_eq!(extract_price(&parse(html)), Some("9.90".parse().unwrap()));
    }

    #[test]
    fn test_absent_is_none_not_error() {
        let html = "<html><body><p>no structured data</p></body></html>";
        assert!(extract_product(&parse(html)).is_none());
        assert!(extract_price(&parse(html)).is_none());
    }
}
