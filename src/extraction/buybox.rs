//! Amazon buy-box price heuristics.
//!
//! Pages that sell the same item once-off and on a "subscribe & save" plan
//! expose several valid prices at once, and the cheapest one is usually the
//! subscription price — exactly the one we must not track. Resolution order:
//!
//! 1. find the "one-time purchase" label and take the price element nearest
//!    to it in the ancestor chain;
//! 2. otherwise fall back to a positional heuristic: the higher of the two
//!    lowest distinct prices in the buy-box region.
//!
//! Both are best-effort. The label text and the region selectors are under
//! Amazon's control, and with three or more distinct prices the fallback
//! still assumes the cheapest is the subscription offer.

use crate::normalize;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

/// Labels marking the one-time-purchase option (pt-BR storefront first).
const ONE_TIME_LABELS: &[&str] = &["compra única", "compra unica", "one-time purchase"];

/// How far up from the label we look for a price before giving up. Keeps the
/// search inside the option widget instead of drifting to the whole page.
const MAX_ANCESTOR_HOPS: usize = 6;

/// Buy-box regions scanned by the positional fallback.
const BUYBOX_REGIONS: &[&str] = &[
    "#buybox .a-price .a-offscreen",
    "#apex_desktop .a-price .a-offscreen",
    "#centerCol .a-price .a-offscreen",
];

/// Reassemble a price split into whole and fraction spans
/// (`<span class="a-price-whole">1.234</span><span class="a-price-fraction">56</span>`).
pub fn price_from_whole_fraction(document: &Html) -> Option<Decimal> {
    let container_selectors = ["#corePriceDisplay_desktop_feature_div .a-price", ".priceToPay"];
    let whole_sel = Selector::parse(".a-price-whole").expect("valid selector");
    let fraction_sel = Selector::parse(".a-price-fraction").expect("valid selector");

    for container_str in container_selectors {
        let container_sel = Selector::parse(container_str).expect("valid selector");
        if let Some(container) = document.select(&container_sel).next() {
            if let Some(price) = assemble(container.select(&whole_sel).next(), container.select(&fraction_sel).next()) {
                return Some(price);
            }
        }
    }

    // No known container: search the whole document.
    let root_sel = Selector::parse("html").expect("valid selector");
    let root = document.select(&root_sel).next()?;
    assemble(root.select(&whole_sel).next(), root.select(&fraction_sel).next())
}

fn assemble(whole: Option<ElementRef>, fraction: Option<ElementRef>) -> Option<Decimal> {
    let whole = whole?;
    let digits: String = element_text(&whole)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    let text = match fraction {
        Some(f) => format!("{digits},{}", element_text(&f)),
        None => digits,
    };
    normalize::parse_price_text(&text)
}

/// Find the price anchored to the one-time-purchase label.
///
/// Locates a short element whose text matches a known label, then walks its
/// ancestors looking for the nearest `.a-offscreen` price.
pub fn price_from_one_time_label(document: &Html) -> Option<Decimal> {
    let any_sel = Selector::parse("span, label, a, div").expect("valid selector");
    let price_sel = Selector::parse(".a-price .a-offscreen, .a-offscreen").expect("valid selector");

    // The anchor is the tightest element wrapping the label; outer containers
    // also contain the competing option's price and would mislead the walk.
    let anchor = document
        .select(&any_sel)
        .filter(|el| {
            let text = element_text(el).to_lowercase();
            text.len() <= 60 && ONE_TIME_LABELS.iter().any(|l| text.contains(l))
        })
        .min_by_key(|el| element_text(el).len())?;

    let price_within = |el: &ElementRef| -> Option<Decimal> {
        for price_el in el.select(&price_sel) {
            if let Some(price) = normalize::parse_price_text(&element_text(&price_el)) {
                if price > Decimal::ZERO {
                    return Some(price);
                }
            }
        }
        None
    };

    if let Some(price) = price_within(&anchor) {
        return Some(price);
    }
    for node in anchor.ancestors().take(MAX_ANCESTOR_HOPS) {
        let Some(ancestor) = ElementRef::wrap(node) else {
            continue;
        };
        if let Some(price) = price_within(&ancestor) {
            return Some(price);
        }
    }
    None
}

/// Positional fallback: the higher of the two lowest distinct prices found
/// in the buy-box region, approximating "skip the discounted subscription
/// price". A single distinct price is returned as-is.
pub fn price_from_buybox_candidates(document: &Html) -> Option<Decimal> {
    let mut prices: Vec<Decimal> = Vec::new();

    for region in BUYBOX_REGIONS {
        let sel = Selector::parse(region).expect("valid selector");
        for el in document.select(&sel) {
            if let Some(price) = normalize::parse_price_text(&element_text(&el)) {
                if price > Decimal::ZERO && !prices.contains(&price) {
                    prices.push(price);
                }
            }
        }
    }

    prices.sort();
    match prices.len() {
        0 => None,
        1 => Some(prices[0]),
        _ => Some(prices[1]),
    }
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_whole_fraction_reassembly() {
        let html = Html::parse_document(
            r#"
            <html><body>
            <div id="corePriceDisplay_desktop_feature_div">
              <span class="a-price">
                <span class="a-price-whole">1.234</span>
                <span class="a-price-fraction">56</span>
              </span>
            </div>
            </body></html>
            "#,
        );
        assert_eq!(price_from_whole_fraction(&html), Some(dec("1234.56")));
    }

    #[test]
    fn test_whole_without_fraction() {
        let html = Html::parse_document(
            r#"<html><body><span class="priceToPay"><span class="a-price-whole">89</span></span></body></html>"#,
        );
        assert_eq!(price_from_whole_fraction(&html), Some(dec("89")));
    }

    #[test]
    fn test_one_time_label_anchors_to_nearest_price() {
        // Subscription widget lists the discounted price first; the label
        // must pull the price from its own option box.
        let html = Html::parse_document(
            r#"
            <html><body>
            <div id="buybox">
              <div class="option">
                <label>Assinatura</label>
                <span class="a-price"><span class="a-offscreen">R$ 37,62</span></span>
              </div>
              <div class="option">
                <label>Compra única</label>
                <span class="a-price"><span class="a-offscreen">R$ 41,80</span></span>
              </div>
            </div>
            </body></html>
            "#,
        );
        assert_eq!(price_from_one_time_label(&html), Some(dec("41.80")));
    }

    #[test]
    fn test_one_time_label_absent() {
        let html = Html::parse_document(
            r#"<html><body><span class="a-offscreen">R$ 10,00</span></body></html>"#,
        );
        assert_eq!(price_from_one_time_label(&html), None);
    }

    #[test]
    fn test_two_lowest_heuristic_picks_higher() {
        let html = Html::parse_document(
            r#"
            <html><body>
            <div id="buybox">
              <span class="a-price"><span class="a-offscreen">R$ 37,62</span></span>
              <span class="a-price"><span class="a-offscreen">R$ 41,80</span></span>
              <span class="a-price"><span class="a-offscreen">R$ 99,90</span></span>
            </div>
            </body></html>
            "#,
        );
        // Distinct ascending: 37.62, 41.80, 99.90 — higher of the two lowest.
        assert_eq!(price_from_buybox_candidates(&html), Some(dec("41.80")));
    }

    #[test]
    fn test_single_price_returned_as_is() {
        let html = Html::parse_document(
            r#"
            <html><body>
            <div id="buybox">
              <span class="a-price"><span class="a-offscreen">R$ 25,00</span></span>
              <span class="a-price"><span class="a-offscreen">R$ 25,00</span></span>
            </div>
            </body></html>
            "#,
        );
        // Duplicates collapse to one distinct price.
        assert_eq!(price_from_buybox_candidates(&html), Some(dec("25.00")));
    }

    #[test]
    fn test_empty_buybox() {
        let html = Html::parse_document("<html><body></body></html>");
        assert_eq!(price_from_buybox_candidates(&html), None);
    }
}
