//! Locale-aware price normalization.
//!
//! Product pages in this domain mix Brazilian grouping (`R$ 1.234,56`),
//! bare comma decimals (`39,60`), canonical dot decimals (`39.60`) and a
//! known upstream rendering defect where a two-digit fractional amount grows
//! an extra digit (`39.600` meaning `39.60`). Everything here is pure and
//! total: a fragment either yields a canonical `Decimal` or `None`, never an
//! error.
//!
//! The plausibility filter and the minor-unit correction are separate
//! functions gated by a configured [`PriceRange`] so their thresholds stay
//! tunable — they are heuristics, not invariants.

use crate::config::PriceRange;
use rust_decimal::Decimal;

/// Parse a price-bearing text fragment scraped from a page.
///
/// Keeps only digits, `.` and `,`, then disambiguates the separators:
/// - both present: the one appearing last is the decimal separator, the
///   other is a thousands separator and is removed;
/// - comma only: decimal separator (`39,60`);
/// - dot only: 2 fractional digits is a decimal; 3 fractional digits behind
///   a short (≤3-digit) integer part is a mangled decimal and the fraction
///   is truncated to 2 digits; 3 fractional digits behind a longer integer
///   part is a thousands separator and is stripped.
pub fn parse_price_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        if cleaned.rfind(',') > cleaned.rfind('.') {
            // Brazilian grouping: 1.234,56
            cleaned.replace('.', "").replace(',', ".")
        } else {
            // US grouping: 1,234.56
            cleaned.replace(',', "")
        }
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else if cleaned.contains('.') {
        normalize_dot_only(&cleaned)
    } else {
        cleaned
    };

    normalized.parse::<Decimal>().ok()
}

/// Disambiguate a dot in a fragment with no comma.
fn normalize_dot_only(cleaned: &str) -> String {
    let parts: Vec<&str> = cleaned.split('.').collect();
    if parts.len() != 2 {
        // Zero or several dots: let the parse decide (several dots fail).
        return cleaned.to_string();
    }
    let (int_part, frac) = (parts[0], parts[1]);
    if frac.len() == 3 {
        if int_part.len() <= 3 {
            // Mangled decimal: 39.600 renders 39.60 with an extra digit.
            format!("{}.{}", int_part, &frac[..2])
        } else {
            // 1234.567 is a thousands group.
            cleaned.replace('.', "")
        }
    } else {
        cleaned.to_string()
    }
}

/// Parse a user-typed target price in either `1.234,56` or `1234.56` style.
///
/// Shares the both-separators disambiguation with [`parse_price_text`] but
/// deliberately not the dot-only heuristics: typed input with a lone dot is
/// already canonical (`80.99`), never a rendering defect.
pub fn parse_price_input(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && cleaned.contains('.') {
        if cleaned.rfind(',') > cleaned.rfind('.') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else if cleaned.contains(',') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    normalized.parse::<Decimal>().ok()
}

/// Sanity filter: is the value inside the configured plausible price range?
///
/// Rejects per-unit prices ("price per liter") and parsing noise that is
/// numeric but not a product price.
pub fn is_plausible(value: Decimal, range: &PriceRange) -> bool {
    value >= range.min && value <= range.max
}

/// Minor-unit correction: some embedded script states carry prices in cents
/// (`1119` for `11.19`). When the value is implausibly large and dividing by
/// 100 lands inside the plausible range, take the quotient.
pub fn correct_minor_units(value: Decimal, range: &PriceRange) -> Decimal {
    if value > range.max {
        let corrected = value / Decimal::from(100);
        if is_plausible(corrected, range) {
            return corrected.round_dp(2);
        }
    }
    value
}

/// Full pipeline for low-trust sources (script state): parse, correct minor
/// units, then gate on plausibility.
pub fn sanitize_price(text: &str, range: &PriceRange) -> Option<Decimal> {
    let parsed = parse_price_text(text)?;
    let corrected = correct_minor_units(parsed, range);
    is_plausible(corrected, range).then_some(corrected)
}
