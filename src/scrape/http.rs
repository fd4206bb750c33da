//! HTTP client wrapping reqwest.
//!
//! Not a browser — plain requests with browser-shaped headers. Handles
//! redirects and timeouts, and classifies anti-bot rejections (403/503) as
//! [`ScrapeError::Blocked`] so callers can apply the blocked-specific retry
//! policy. No internal retries: that policy lives in the batch monitor, not
//! here.

use crate::error::{Result, ScrapeError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;

/// HTTP statuses treated as anti-automation blocks rather than transport
/// failures. 403 is the VTEX storefront pattern, 503 the Amazon one.
const BLOCKED_STATUSES: &[u16] = &[403, 503];

pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET a page as text. The user agent is supplied per request so the
    /// orchestrator can rotate it from its injected RNG.
    pub async fn fetch_page(&self, url: &str, user_agent: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if BLOCKED_STATUSES.contains(&status) {
            return Err(ScrapeError::Blocked { status });
        }
        if !(200..300).contains(&status) {
            return Err(ScrapeError::Http { status });
        }
        Ok(resp.text().await.unwrap_or_default())
    }

    /// GET a JSON endpoint. Same status classification as [`fetch_page`].
    pub async fn fetch_json(&self, url: &str, user_agent: &str) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status().as_u16();
        if BLOCKED_STATUSES.contains(&status) {
            return Err(ScrapeError::Blocked { status });
        }
        if !(200..300).contains(&status) {
            return Err(ScrapeError::Http { status });
        }
        resp.json().await.map_err(ScrapeError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_does_not_panic() {
        let _ = HttpClient::new(10_000);
    }

    #[test]
    fn test_blocked_statuses() {
        assert!(BLOCKED_STATUSES.contains(&403));
        assert!(BLOCKED_STATUSES.contains(&503));
        assert!(!BLOCKED_STATUSES.contains(&500));
        assert!(!BLOCKED_STATUSES.contains(&404));
    }
}
