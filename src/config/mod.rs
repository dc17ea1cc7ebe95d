use std::path::{Path, PathBuf};

use tracing::warn;
use url::Url;

use crate::domain::{FeedConfig, SourceConfig};
use crate::errors::{FeederError, FeederResult};

pub const WEBHOOK_URL_VAR: &str = "DISCORD_WEBHOOK_URL";
pub const EXPORT_FILE_NAME: &str = "cyber_news_feed.csv";
pub const SEEN_FILE_NAME: &str = "seen_articles.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: Option<String>,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> Self {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        let webhook_url = std::env::var(WEBHOOK_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty());

        let data_dir = std::env::var("CYBERFEED_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let log_dir = std::env::var("CYBERFEED_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Self {
            webhook_url,
            data_dir,
            log_dir,
        }
    }

    /// The webhook secret is only mandatory for runs that deliver.
    pub fn require_webhook_url(&self) -> FeederResult<&str> {
        self.webhook_url
            .as_deref()
            .ok_or_else(|| FeederError::MissingEnvVar(WEBHOOK_URL_VAR.to_string()))
    }

    pub fn seen_store_path(&self) -> PathBuf {
        self.data_dir.join(SEEN_FILE_NAME)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(EXPORT_FILE_NAME)
    }
}

/// Load the feed configuration, falling back to defaults when the file does not exist.
pub fn load_feed_config(path: &Path) -> FeederResult<FeedConfig> {
    let config = match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<FeedConfig>(&content).map_err(|e| {
            FeederError::Config(format!("{}: {}", path.display(), e))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Config file not found, using defaults");
            FeedConfig::default()
        }
        Err(e) => return Err(e.into()),
    };

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &FeedConfig) -> FeederResult<()> {
    for source in &config.sources {
        validate_source(source)?;
    }
    Ok(())
}

fn validate_source(source: &SourceConfig) -> FeederResult<()> {
    let required = [
        ("name", &source.name),
        ("url", &source.url),
        ("article_selector", &source.article_selector),
        ("title_selector", &source.title_selector),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(FeederError::Config(format!(
                "source '{}' has an empty '{}'",
                source.name, key
            )));
        }
    }

    let url = Url::parse(&source.url).map_err(|e| {
        FeederError::Config(format!("source '{}' has invalid url: {}", source.name, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FeederError::Config(format!(
            "source '{}' url must be http(s), got '{}'",
            source.name,
            url.scheme()
        )));
    }

    Ok(())
}
