//! Price scraping from inline script state.
//!
//! VTEX storefronts render prices client-side from a serialized `__STATE__`
//! payload, so the value is often present only inside inline `<script>`
//! text. This layer runs the profile's ordered regex set against the raw
//! HTML and applies the minor-unit correction (VTEX sometimes stores cents)
//! plus the plausibility filter before accepting anything.

use crate::config::PriceRange;
use crate::normalize;
use regex::Regex;
use rust_decimal::Decimal;

/// Extract a price token from raw page source using the profile's patterns.
///
/// Patterns are tried in order; the first capture that survives the
/// minor-unit correction and the plausibility gate wins. All-miss is `None`.
pub fn extract_price(raw_html: &str, patterns: &[&str], range: &PriceRange) -> Option<Decimal> {
    for pattern in patterns {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };
        for caps in re.captures_iter(raw_html) {
            let token = match caps.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            if let Some(price) = normalize::sanitize_price(token, range) {
                return Some(price);
            }
        }
    }
    None
}
