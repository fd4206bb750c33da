//! Catalog-API price fallback.
//!
//! When no in-page signal yields a price, the VTEX catalog search API often
//! still does. Endpoints from the store profile are tried in order; the
//! first response carrying a parseable offer price wins. Everything here is
//! best-effort — endpoint errors just move on to the next candidate.

use crate::extraction::profiles;
use crate::scrape::http::HttpClient;
use crate::stores::Store;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

/// Title and price recovered from a catalog API response.
#[derive(Debug, Clone)]
pub struct ApiPrice {
    pub title: Option<String>,
    pub price: Decimal,
}

/// Try each catalog endpoint for the store until one yields an offer price.
///
/// `base_override` swaps the endpoint authority, used to point the fallback
/// at a fixture server in tests.
pub async fn fetch_catalog_price(
    client: &HttpClient,
    store: Store,
    sku: &str,
    base_override: Option<&str>,
    user_agent: &str,
) -> Option<ApiPrice> {
    let base = base_override.unwrap_or_else(|| store.base_url());

    for template in profiles::profile(store).api_endpoints {
        let endpoint = template.replace("{base}", base).replace("{sku}", sku);
        let body = match client.fetch_json(&endpoint, user_agent).await {
            Ok(body) => body,
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "catalog endpoint failed, trying next");
                continue;
            }
        };
        if let Some(found) = parse_catalog_response(&body) {
            return Some(found);
        }
    }

    None
}

/// Pull `productName` and the first seller's offer price out of a VTEX
/// catalog search response (`[{ items: [{ sellers: [{ commertialOffer:
/// { Price, spotPrice } }] }] }]` — the misspelling is VTEX's own).
fn parse_catalog_response(body: &Value) -> Option<ApiPrice> {
    let first = body.as_array()?.first()?;

    let title = first
        .get("productName")
        .or_else(|| first.get("name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let offer = first
        .get("items")?
        .as_array()?
        .first()?
        .get("sellers")?
        .as_array()?
        .first()?
        .get("commertialOffer")?;

    let price = offer
        .get("Price")
        .or_else(|| offer.get("spotPrice"))
        .and_then(decimal_value)
        .filter(|p| *p > Decimal::ZERO)?;

    Some(ApiPrice { title, price })
}

fn decimal_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(_) => v.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
