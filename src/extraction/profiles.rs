//! Per-store extraction profiles.
//!
//! Everything site-specific lives here as data: ordered selector lists per
//! field (most specific first), script-state regexes, availability markers
//! and catalog-API endpoint templates. The chain drivers in the parent
//! module consume these tables — adding a store is a new table, not a new
//! type hierarchy.

use crate::stores::Store;

/// Declarative extraction profile for one site family.
pub struct SiteProfile {
    pub store: Store,
    /// Ordered title selectors; first match longer than 3 chars wins.
    pub title_selectors: &'static [&'static str],
    /// Ordered current-price selectors; first positive parse wins.
    pub price_selectors: &'static [&'static str],
    /// Ordered original/list-price selectors.
    pub original_price_selectors: &'static [&'static str],
    /// Ordered product-image selectors (src or data-src attribute).
    pub image_selectors: &'static [&'static str],
    /// Selectors whose presence marks the product unavailable.
    pub unavailable_selectors: &'static [&'static str],
    /// Page-text phrases marking the product unavailable.
    pub unavailable_phrases: &'static [&'static str],
    /// Regexes pulling price tokens out of inline script state, in order.
    pub script_state_patterns: &'static [&'static str],
    /// Catalog-API endpoint templates (`{base}`, `{sku}` placeholders).
    /// Empty for stores without an API fallback.
    pub api_endpoints: &'static [&'static str],
}

/// VTEX price keys observed in embedded `__STATE__` payloads. Shared by the
/// two VTEX storefronts.
const VTEX_SCRIPT_PATTERNS: &[&str] = &[
    r#""sellingPrice"\s*:\s*(\d+(?:\.\d+)?)"#,
    r#""Price"\s*:\s*(\d+(?:\.\d+)?)"#,
    r#""price"\s*:\s*(\d+(?:\.\d+)?)"#,
    r#""bestPrice"\s*:\s*(\d+(?:\.\d+)?)"#,
    r#""spotPrice"\s*:\s*(\d+(?:\.\d+)?)"#,
];

static CARREFOUR: SiteProfile = SiteProfile {
    store: Store::Carrefour,
    title_selectors: &[
        ".vtex-store-components-3-x-productBrand",
        ".vtex-store-components-3-x-productNameContainer",
        r#"h1[class*="productName"]"#,
        ".productName",
        "h1.product-name",
        ".product-title",
        "h1",
    ],
    price_selectors: &[
        // Blue royal span is the main displayed price on the current storefront.
        "span.text-blue-royal.font-bold.text-xl",
        r#"span[class*="text-blue-royal"][class*="font-bold"]"#,
        r#"span[class*="blue-royal"]"#,
        r#"[class*="sellingPriceValue"]"#,
        ".vtex-product-price-1-x-sellingPriceValue",
        ".skuBestPrice",
        ".price-best-price",
        r#"[data-testid="price"]"#,
    ],
    original_price_selectors: &[
        ".vtex-product-price-1-x-listPrice",
        ".vtex-store-components-3-x-listPrice",
        ".skuListPrice",
        ".list-price",
        r#"[class*="listPrice"]"#,
    ],
    image_selectors: &[
        ".vtex-store-components-3-x-productImage img",
        r#"[class*="productImage"] img"#,
        r#"img[class*="product"]"#,
    ],
    unavailable_selectors: &[],
    unavailable_phrases: &["indisponível", "esgotado"],
    script_state_patterns: VTEX_SCRIPT_PATTERNS,
    api_endpoints: &[
        "{base}/api/catalog_system/pub/products/search?fq=productId:{sku}",
        "{base}/api/catalog_system/pub/products/search?fq=skuId:{sku}",
        "{base}/api/catalog_system/pub/products/search/{sku}",
    ],
};

static ZAFFARI: SiteProfile = SiteProfile {
    store: Store::Zaffari,
    title_selectors: &[
        ".vtex-store-components-3-x-productBrand",
        ".vtex-store-components-3-x-productNameContainer",
        ".productName",
        "h1.product-name",
        ".product-title",
        r#"h1[class*="productName"]"#,
        ".vtex-product-summary-2-x-productBrand",
        "h1",
    ],
    price_selectors: &[
        ".zaffarilab-zaffari-produto-1-x-ProductPriceSellingPriceValue",
        ".vtex-product-price-1-x-sellingPrice",
        ".vtex-product-price-1-x-currencyContainer",
        ".vtex-store-components-3-x-sellingPrice",
        ".skuBestPrice",
        ".price-best-price",
        ".product-price .best-price",
        r#"[class*="sellingPrice"]"#,
        r#"[class*="bestPrice"]"#,
        ".price",
    ],
    original_price_selectors: &[
        ".vtex-product-price-1-x-listPrice",
        ".vtex-store-components-3-x-listPrice",
        ".skuListPrice",
        ".list-price",
        ".old-price",
        r#"[class*="listPrice"]"#,
    ],
    image_selectors: &[
        ".vtex-store-components-3-x-productImage img",
        ".product-image img",
        r#"[class*="productImage"] img"#,
        ".main-image img",
        r#"img[class*="product"]"#,
    ],
    unavailable_selectors: &[
        ".vtex-store-components-3-x-unavailableContainer",
        ".product-unavailable",
        r#"[class*="unavailable"]"#,
    ],
    unavailable_phrases: &["indisponível", "esgotado"],
    script_state_patterns: VTEX_SCRIPT_PATTERNS,
    api_endpoints: &[],
};

static AMAZON: SiteProfile = SiteProfile {
    store: Store::Amazon,
    title_selectors: &["#productTitle"],
    price_selectors: &[
        // Main price display area, most reliable for the buy-box price.
        "#corePriceDisplay_desktop_feature_div .priceToPay .a-offscreen",
        "#corePrice_desktop_feature_div .priceToPay .a-offscreen",
        ".priceToPay .a-offscreen",
        "#apex_offerDisplay_desktop .a-price .a-offscreen",
        "#apex_desktop .a-price .a-offscreen",
        "#corePriceDisplay_desktop_feature_div .a-price .a-offscreen",
        "#corePrice_feature_div .a-price .a-offscreen",
        // Legacy price blocks.
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        "#priceblock_saleprice",
    ],
    original_price_selectors: &[
        ".a-text-price .a-offscreen",
        "#listPrice",
        ".priceBlockStrikePriceString",
    ],
    image_selectors: &["#landingImage", "#imgBlkFront", "#main-image", ".a-dynamic-image"],
    unavailable_selectors: &["#outOfStock"],
    unavailable_phrases: &["indisponível", "currently unavailable"],
    script_state_patterns: &[],
    api_endpoints: &[],
};

/// Look up the extraction profile for a store.
pub fn profile(store: Store) -> &'static SiteProfile {
    match store {
        Store::Carrefour => &CARREFOUR,
        Store::Zaffari => &ZAFFARI,
        Store::Amazon => &AMAZON,
    }
}
