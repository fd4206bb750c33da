//! Scrape error taxonomy.
//!
//! Every failure a single scrape can produce is a variant here, so callers
//! can react per kind: `UnrecognizedUrl`/`InvalidUrl` fail before any network
//! call, `Blocked` is retried once with backoff by the batch monitor, and
//! `Transport`/`Http` are left to the caller. Missing fields are never
//! errors — they travel as `Option` values on the scrape result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unrecognized product URL: {0}")]
    UnrecognizedUrl(String),

    #[error("not a valid {store} product URL: {url}")]
    InvalidUrl { store: &'static str, url: String },

    #[error("blocked by the site (HTTP {status})")]
    Blocked { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error {status}")]
    Http { status: u16 },
}

impl ScrapeError {
    /// Anti-bot rejection, as opposed to an ordinary transport failure.
    /// The batch monitor applies its backoff-and-retry policy only to these.
    pub fn is_blocked(&self) -> bool {
        matches!(self, ScrapeError::Blocked { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
