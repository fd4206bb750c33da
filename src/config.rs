//! Application settings, loaded from environment variables with defaults.

use rust_decimal::Decimal;
use std::path::PathBuf;

/// Default inter-request delay bounds in seconds.
pub const SCRAPE_DELAY_MIN_SECS: u64 = 2;
pub const SCRAPE_DELAY_MAX_SECS: u64 = 5;

/// Default HTTP request timeout (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Backoff before retrying a blocked request during a batch update (seconds).
pub const BLOCKED_BACKOFF_SECS: u64 = 60;

/// How many times a blocked item is retried before it is given up on.
/// Anything beyond one retry mostly just prolongs a batch.
pub const BLOCKED_RETRIES: u32 = 1;

/// Plausible price range in local currency units. Values outside this range
/// are rejected by the sanity filter (unit prices, parsing noise) or run
/// through the minor-unit correction.
pub const PRICE_RANGE_MIN: &str = "0.10";
pub const PRICE_RANGE_MAX: &str = "50000";

/// Lookback windows (days) for the statistics engine.
pub const STATS_WINDOWS: &[u32] = &[7, 30];

/// Rotated user agents. The scraper picks one per request from an injected
/// RNG so tests can pin the rotation.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

/// Plausible price bounds consumed by the normalizer's sanity filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: PRICE_RANGE_MIN.parse().expect("valid default min"),
            max: PRICE_RANGE_MAX.parse().expect("valid default max"),
        }
    }
}

/// Settings for one process run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Inter-request delay bounds in milliseconds (SCRAPE_DELAY_MIN/MAX, seconds).
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// HTTP timeout in milliseconds (REQUEST_TIMEOUT, seconds).
    pub timeout_ms: u64,
    /// Blocked-retry backoff in milliseconds (BLOCKED_BACKOFF_SECS).
    pub blocked_backoff_ms: u64,
    /// Blocked retry count (BLOCKED_RETRIES).
    pub blocked_retries: u32,
    /// Plausible price range (PRICE_RANGE_MIN/MAX).
    pub price_range: PriceRange,
    /// Statistics lookback windows in days (STATS_WINDOWS, comma-separated).
    pub stats_windows: Vec<u32>,
    /// Database file path (DB_PATH). Defaults to ~/.pricewatch/pricewatch.db.
    pub db_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let delay_min = env_u64("SCRAPE_DELAY_MIN", SCRAPE_DELAY_MIN_SECS);
        let delay_max = env_u64("SCRAPE_DELAY_MAX", SCRAPE_DELAY_MAX_SECS).max(delay_min);

        let price_range = PriceRange {
            min: env_decimal("PRICE_RANGE_MIN", PRICE_RANGE_MIN),
            max: env_decimal("PRICE_RANGE_MAX", PRICE_RANGE_MAX),
        };

        let stats_windows = std::env::var("STATS_WINDOWS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|s| s.trim().parse::<u32>().ok())
                    .filter(|&w| w > 0)
                    .collect::<Vec<u32>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| STATS_WINDOWS.to_vec());

        let db_path = std::env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        Self {
            delay_min_ms: delay_min * 1000,
            delay_max_ms: delay_max * 1000,
            timeout_ms: env_u64("REQUEST_TIMEOUT", REQUEST_TIMEOUT_SECS) * 1000,
            blocked_backoff_ms: env_u64("BLOCKED_BACKOFF_SECS", BLOCKED_BACKOFF_SECS) * 1000,
            blocked_retries: env_u64("BLOCKED_RETRIES", BLOCKED_RETRIES as u64) as u32,
            price_range,
            stats_windows,
            db_path,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_min_ms: SCRAPE_DELAY_MIN_SECS * 1000,
            delay_max_ms: SCRAPE_DELAY_MAX_SECS * 1000,
            timeout_ms: REQUEST_TIMEOUT_SECS * 1000,
            blocked_backoff_ms: BLOCKED_BACKOFF_SECS * 1000,
            blocked_retries: BLOCKED_RETRIES,
            price_range: PriceRange::default(),
            stats_windows: STATS_WINDOWS.to_vec(),
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pricewatch")
        .join("pricewatch.db")
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_decimal(key: &str, default: &str) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_else(|| default.parse().expect("valid default decimal"))
}
