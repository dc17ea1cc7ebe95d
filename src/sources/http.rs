use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, DNT,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::errors::{FeederError, FeederResult};
use crate::sources::traits::PageFetcher;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Statuses worth another attempt; anything else non-2xx fails immediately.
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): base, 2*base, 4*base, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Blocking page fetcher with browser-like headers. Cloning shares the connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new() -> FeederResult<Self> {
        Self::with_retry_policy(RetryPolicy::default())
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> FeederResult<Self> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .build()?;

        Ok(Self { client, retry })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> FeederResult<String> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let last_error = match self.client.get(url).timeout(timeout).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(url, attempt, "Fetched page");
                        return Ok(response.text()?);
                    }
                    if !RETRYABLE_STATUSES.contains(&status) {
                        warn!(url, status = status.as_u16(), "Request failed");
                        return Err(FeederError::HttpStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    format!("status {}", status.as_u16())
                }
                // A malformed URL will not get better on retry
                Err(e) if e.is_builder() => return Err(e.into()),
                Err(e) => e.to_string(),
            };

            if attempt >= self.retry.max_attempts {
                warn!(url, attempts = attempt, error = %last_error, "Retries exhausted");
                return Err(FeederError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                    last_error,
                });
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %last_error,
                "Retrying request"
            );
            thread::sleep(delay);
        }
    }
}
