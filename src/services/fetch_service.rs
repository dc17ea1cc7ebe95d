use tracing::{error, info, warn};

use crate::domain::{Article, FeedConfig, SourceConfig};
use crate::errors::FeederResult;
use crate::sources::{extract_articles, PageFetcher, Summarizer};

pub struct FetchService<F: PageFetcher> {
    fetcher: F,
    config: FeedConfig,
}

impl<F: PageFetcher> FetchService<F> {
    pub fn new(fetcher: F, config: FeedConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Download a source's listing page
    pub fn fetch_listing(&self, source: &SourceConfig) -> FeederResult<String> {
        self.fetcher.fetch(&source.url, self.config.fetch_timeout())
    }

    /// Parse a listing page into at most `max_articles` articles
    pub fn extract(&self, source: &SourceConfig, html: &str) -> FeederResult<Vec<Article>> {
        let articles = extract_articles(html, source, self.config.max_articles)?;
        info!(source = %source.name, count = articles.len(), "Extracted articles");
        Ok(articles)
    }

    /// Attach a summary to every article. A failed summary leaves the field empty.
    pub fn summarize_all(&self, source: &SourceConfig, articles: &mut [Article]) -> usize {
        let summarizer = Summarizer::new(&self.fetcher, self.config.fetch_timeout());
        let mut summarized = 0;

        for article in articles.iter_mut() {
            article.summary = match summarizer.summarize(
                &article.link,
                source.body_selector(),
                self.config.summary_sentences,
            ) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(source = %source.name, link = %article.link, error = %e, "Summary failed");
                    None
                }
            };
            if article.summary.is_some() {
                summarized += 1;
            }
        }

        summarized
    }

    /// Fetch, extract and (when enabled) summarize one source
    pub fn fetch_source(&self, source: &SourceConfig) -> FeederResult<Vec<Article>> {
        let html = self.fetch_listing(source)?;
        let mut articles = self.extract(source, &html)?;

        if self.config.summarize {
            self.summarize_all(source, &mut articles);
        }

        Ok(articles)
    }

    /// Articles from every configured source. A failing source contributes nothing.
    pub fn fetch_all(&self) -> Vec<Article> {
        let mut articles = Vec::new();

        for source in &self.config.sources {
            match self.fetch_source(source) {
                Ok(fetched) => articles.extend(fetched),
                Err(e) => {
                    error!(source = %source.name, url = %source.url, error = %e, "Error fetching articles");
                }
            }
        }

        articles
    }
}
