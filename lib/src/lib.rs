//! Webhook execution bindings for Rust
//! Provides the embed message types and a blocking client that posts them to a webhook URL

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default wait when a 429 response carries no usable `retry_after`.
pub const DEFAULT_RETRY_AFTER_SECS: f64 = 1.0;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: f64 },
    #[error("Webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub description: String,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

/// Body of a webhook execution. `content` is always serialized, as `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl WebhookMessage {
    pub fn with_embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    #[serde(default = "default_retry_after")]
    retry_after: f64,
}

fn default_retry_after() -> f64 {
    DEFAULT_RETRY_AFTER_SECS
}

pub struct WebhookClient {
    url: String,
    client: Client,
}

impl WebhookClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Post a single message. A 429 is reported as `RateLimited` with the sink's `retry_after`.
    pub fn execute(&self, message: &WebhookMessage) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(message).send()?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .json::<RateLimitBody>()
                .map(|body| body.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(WebhookError::RateLimited {
                retry_after: retry_after.max(0.0),
            });
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
