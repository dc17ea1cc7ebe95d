use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use webhook::{WebhookClient, WebhookError, DEFAULT_RETRY_AFTER_SECS};

use crate::domain::{Article, Notification};
use crate::errors::{FeederError, FeederResult};

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub rate_limited: usize,
}

/// Delivers a batch of new articles to the notification sink.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn deliver(&self, articles: &[Article]) -> FeederResult<DeliveryReport>;
}

pub struct NotificationService {
    client: WebhookClient,
}

impl NotificationService {
    pub fn new(webhook_url: &str) -> FeederResult<Self> {
        let client = WebhookClient::new(webhook_url, NOTIFY_TIMEOUT)?;
        Ok(Self { client })
    }

    /// Send one article as a webhook embed
    pub fn send(&self, article: &Article) -> Result<(), WebhookError> {
        let message = Notification::from_article(article).to_message(Utc::now());
        self.client.execute(&message)
    }
}

impl Notifier for NotificationService {
    /// Sends strictly one at a time. A rate-limited message is not resent; the
    /// next one waits out `retry_after`. Any other failure abandons the rest.
    fn deliver(&self, articles: &[Article]) -> FeederResult<DeliveryReport> {
        let mut report = DeliveryReport::default();

        for article in articles {
            match self.send(article) {
                Ok(()) => {
                    debug!(link = %article.link, "Delivered");
                    report.sent += 1;
                }
                Err(WebhookError::RateLimited { retry_after }) => {
                    warn!(link = %article.link, retry_after, "Webhook rate limited, pausing");
                    report.rate_limited += 1;
                    let pause = Duration::try_from_secs_f64(retry_after)
                        .unwrap_or(Duration::from_secs_f64(DEFAULT_RETRY_AFTER_SECS));
                    thread::sleep(pause);
                }
                Err(e) => {
                    return Err(FeederError::DeliveryAborted {
                        sent: report.sent,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            sent = report.sent,
            rate_limited = report.rate_limited,
            "Delivery finished"
        );
        Ok(report)
    }
}
