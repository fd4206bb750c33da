//! Supported site families: URL classification, validation and SKU extraction.
//!
//! Classification is total — a URL either maps to one of the enumerated
//! stores or comes back as an explicit [`ScrapeError::UnrecognizedUrl`],
//! never a silent default. Stores are matched in declaration order so
//! overlapping substrings cannot flip the result between runs.

use crate::error::ScrapeError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// A supported retail site family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Carrefour,
    Zaffari,
    Amazon,
}

impl Store {
    /// Fixed classification priority. Most specific domains first.
    pub const ALL: [Store; 3] = [Store::Carrefour, Store::Zaffari, Store::Amazon];

    pub fn display_name(&self) -> &'static str {
        match self {
            Store::Carrefour => "Carrefour",
            Store::Zaffari => "Zaffari",
            Store::Amazon => "Amazon",
        }
    }

    /// Stable identifier used in the database and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Store::Carrefour => "carrefour",
            Store::Zaffari => "zaffari",
            Store::Amazon => "amazon",
        }
    }

    pub fn from_str(s: &str) -> Option<Store> {
        match s {
            "carrefour" => Some(Store::Carrefour),
            "zaffari" => Some(Store::Zaffari),
            "amazon" => Some(Store::Amazon),
            _ => None,
        }
    }

    /// Known domains for this store. The first entry is canonical.
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            Store::Carrefour => &["mercado.carrefour.com.br"],
            Store::Zaffari => &["zaffari.com.br", "www.zaffari.com.br"],
            Store::Amazon => &["amazon.com.br", "amazon.com", "amzn.to"],
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Store::Carrefour => "https://mercado.carrefour.com.br",
            Store::Zaffari => "https://www.zaffari.com.br",
            Store::Amazon => "https://www.amazon.com.br",
        }
    }

    /// Classify a URL into a store by substring match, in priority order.
    pub fn classify(url: &str) -> Result<Store, ScrapeError> {
        let lower = url.to_lowercase();
        for store in Store::ALL {
            if store.domains().iter().any(|d| lower.contains(d)) {
                return Ok(store);
            }
        }
        Err(ScrapeError::UnrecognizedUrl(url.to_string()))
    }

    /// Check that a URL has this store's expected product-page shape:
    /// domain allow-list plus the store's required path token.
    pub fn validate_url(&self, url: &str) -> bool {
        let parsed = match Url::parse(&ensure_scheme(url)) {
            Ok(u) => u,
            Err(_) => return false,
        };
        let host = match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };
        let host_ok = self.domains().iter().any(|d| {
            host == *d || host == format!("www.{d}") || host.ends_with(&format!(".{d}"))
        });
        if !host_ok {
            return false;
        }
        match self {
            // VTEX storefronts end product paths with a /p marker.
            Store::Carrefour | Store::Zaffari => parsed.path().contains("/p"),
            // Amazon product URLs must carry an extractable ASIN.
            Store::Amazon => self.extract_sku(url).is_some(),
        }
    }

    /// Pull the site-local product identifier out of the URL path.
    ///
    /// VTEX stores put a numeric SKU right before the trailing `/p`
    /// (`.../queijo-mussarela-150g-1008729/p`); Amazon uses 10-character
    /// ASINs in several path shapes. Invalid shapes yield `None`, never an
    /// error.
    pub fn extract_sku(&self, url: &str) -> Option<String> {
        match self {
            Store::Carrefour | Store::Zaffari => {
                for pattern in [r"-(\d+)/p", r"/(\d+)/p"] {
                    let re = Regex::new(pattern).expect("valid sku regex");
                    if let Some(caps) = re.captures(url) {
                        return Some(caps[1].to_string());
                    }
                }
                None
            }
            Store::Amazon => {
                const ASIN_PATTERNS: &[&str] = &[
                    r"(?i)/dp/([A-Z0-9]{10})",
                    r"(?i)/gp/product/([A-Z0-9]{10})",
                    r"(?i)/product/([A-Z0-9]{10})",
                    r"(?i)asin=([A-Z0-9]{10})",
                ];
                for pattern in ASIN_PATTERNS {
                    let re = Regex::new(pattern).expect("valid asin regex");
                    if let Some(caps) = re.captures(url) {
                        return Some(caps[1].to_uppercase());
                    }
                }
                None
            }
        }
    }

    /// Normalize a URL for storage and fetching.
    ///
    /// Amazon URLs are canonicalized to `/dp/{ASIN}`; the VTEX stores only
    /// get a scheme prefixed when missing.
    pub fn normalize_url(&self, url: &str) -> String {
        match self {
            Store::Amazon => match self.extract_sku(url) {
                Some(asin) => format!("{}/dp/{asin}", self.base_url()),
                None => ensure_scheme(url),
            },
            _ => ensure_scheme(url),
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

fn ensure_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Recover a display title from a VTEX product URL slug.
///
/// `.../agua-de-coco-integral-dikoko-caixa-1l-3006379/p` → "Agua De Coco
/// Integral Dikoko Caixa 1l". Used as a last-resort title when the page
/// yields nothing.
pub fn title_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(&ensure_scheme(url)).ok()?;
    let path = parsed.path().trim_matches('/');
    let path = path.strip_suffix("/p").unwrap_or(path);
    let slug = path.rsplit('/').next()?;

    // Drop the trailing numeric SKU segment.
    let re = Regex::new(r"-\d+$").expect("valid slug regex");
    let slug = re.replace(slug, "");
    if slug.is_empty() {
        return None;
    }

    let title = slug
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}
