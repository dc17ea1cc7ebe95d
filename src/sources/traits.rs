use std::time::Duration;

use crate::errors::FeederResult;

/// Retrieves the HTML of a page. Shared by listing fetches and the summarizer.
#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str, timeout: Duration) -> FeederResult<String>;
}
