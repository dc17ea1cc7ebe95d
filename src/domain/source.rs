use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Container used by the summarizer when a source does not name one.
pub const DEFAULT_BODY_SELECTOR: &str = "div.articleBody";

/// Extraction ruleset for one listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub article_selector: String,
    pub title_selector: String,
    #[serde(default)]
    pub category_selector: Option<String>,
    #[serde(default)]
    pub description_selector: Option<String>,
    #[serde(default)]
    pub author_selector: Option<String>,
    #[serde(default)]
    pub date_selector: Option<String>,
    #[serde(default)]
    pub body_selector: Option<String>,
    #[serde(default)]
    pub link_prefix: Option<String>,
    #[serde(default = "default_true")]
    pub exclude_sponsored: bool,
}

impl SourceConfig {
    pub fn new(name: &str, url: &str, article_selector: &str, title_selector: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            article_selector: article_selector.to_string(),
            title_selector: title_selector.to_string(),
            category_selector: None,
            description_selector: None,
            author_selector: None,
            date_selector: None,
            body_selector: None,
            link_prefix: None,
            exclude_sponsored: true,
        }
    }

    /// The source shipped out of the box.
    pub fn bleeping_computer() -> Self {
        Self {
            category_selector: Some("div.bc_latest_news_category a".to_string()),
            description_selector: Some("p".to_string()),
            author_selector: Some("li.bc_news_author a".to_string()),
            date_selector: Some("li.bc_news_date".to_string()),
            ..Self::new(
                "BleepingComputer",
                "https://www.bleepingcomputer.com/news/security/",
                "li:has(div.bc_latest_news_text)",
                "h4 a",
            )
        }
    }

    pub fn link_prefix(&self) -> &str {
        self.link_prefix.as_deref().unwrap_or("")
    }

    pub fn body_selector(&self) -> &str {
        self.body_selector.as_deref().unwrap_or(DEFAULT_BODY_SELECTOR)
    }
}

/// Top-level feed configuration. Each key falls back to its default independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// Seconds between runs. Scheduling is left to cron/systemd.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default = "default_true")]
    pub summarize: bool,
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl FeedConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            max_articles: default_max_articles(),
            check_interval: default_check_interval(),
            summarize: true,
            summary_sentences: default_summary_sentences(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sources() -> Vec<SourceConfig> {
    vec![SourceConfig::bleeping_computer()]
}

fn default_max_articles() -> usize {
    5
}

fn default_check_interval() -> u64 {
    300
}

fn default_summary_sentences() -> usize {
    2
}

fn default_fetch_timeout_secs() -> u64 {
    10
}
