use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::domain::{Article, SourceConfig};
use crate::errors::{FeederError, FeederResult};
use crate::services::dedup_service::DedupService;
use crate::services::export_service::CsvExporter;
use crate::services::fetch_service::FetchService;
use crate::services::notification_service::Notifier;
use crate::sources::PageFetcher;
use crate::storage::SeenStore;

/// Furthest step a source reached in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Summarizing,
    Deduplicating,
    Delivering,
    Done,
}

#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub source: String,
    pub stage: Stage,
    pub extracted: usize,
    pub new: usize,
    pub delivered: usize,
    pub new_articles: Vec<Article>,
    /// Set when the source stopped early; `stage` is where it stopped.
    pub error: Option<String>,
    /// The seen store could not be read or written, so nothing was treated as new.
    pub store_degraded: bool,
}

impl SourceOutcome {
    fn started(source: &SourceConfig) -> Self {
        Self {
            source: source.name.clone(),
            stage: Stage::Fetching,
            extracted: 0,
            new: 0,
            delivered: 0,
            new_articles: Vec::new(),
            error: None,
            store_degraded: false,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn total_extracted(&self) -> usize {
        self.outcomes.iter().map(|o| o.extracted).sum()
    }

    pub fn total_new(&self) -> usize {
        self.outcomes.iter().map(|o| o.new).sum()
    }

    pub fn total_delivered(&self) -> usize {
        self.outcomes.iter().map(|o| o.delivered).sum()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.iter().filter(|o| o.failed())
    }
}

/// Drives one pass over every configured source: fetch, extract, summarize,
/// deduplicate, deliver. Sources run one after another and a failure stays
/// inside its own source.
pub struct PipelineService<F: PageFetcher, S: SeenStore, N: Notifier> {
    fetch: FetchService<F>,
    dedup: DedupService<S>,
    notifier: Option<N>,
    exporter: Option<CsvExporter>,
}

impl<F: PageFetcher, S: SeenStore, N: Notifier> PipelineService<F, S, N> {
    pub fn new(fetch: FetchService<F>, dedup: DedupService<S>, notifier: N) -> Self {
        Self {
            fetch,
            dedup,
            notifier: Some(notifier),
            exporter: None,
        }
    }

    /// Report what would be delivered. The seen store is read but never written.
    pub fn dry_run(fetch: FetchService<F>, dedup: DedupService<S>) -> Self {
        Self {
            fetch,
            dedup,
            notifier: None,
            exporter: None,
        }
    }

    pub fn with_exporter(mut self, exporter: CsvExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.notifier.is_none()
    }

    pub fn run(&self, now: DateTime<Utc>) -> RunReport {
        let sources = &self.fetch.config().sources;
        info!(sources = sources.len(), dry_run = self.is_dry_run(), "Starting run");

        let outcomes = sources
            .iter()
            .map(|source| self.run_source(source, now))
            .collect();
        let report = RunReport { outcomes };

        info!(
            extracted = report.total_extracted(),
            new = report.total_new(),
            delivered = report.total_delivered(),
            failed = report.failed_sources().count(),
            "Run finished"
        );
        report
    }

    fn run_source(&self, source: &SourceConfig, now: DateTime<Utc>) -> SourceOutcome {
        let mut outcome = SourceOutcome::started(source);

        match self.advance(source, now, &mut outcome) {
            Ok(()) => outcome.stage = Stage::Done,
            Err(e) => {
                error!(
                    source = %source.name,
                    url = %source.url,
                    stage = ?outcome.stage,
                    error = %e,
                    "Source failed"
                );
                outcome.error = Some(e.to_string());
            }
        }

        outcome
    }

    fn advance(
        &self,
        source: &SourceConfig,
        now: DateTime<Utc>,
        outcome: &mut SourceOutcome,
    ) -> FeederResult<()> {
        outcome.stage = Stage::Fetching;
        let html = self.fetch.fetch_listing(source)?;

        outcome.stage = Stage::Extracting;
        let mut articles = self.fetch.extract(source, &html)?;
        outcome.extracted = articles.len();

        if self.fetch.config().summarize && !articles.is_empty() {
            outcome.stage = Stage::Summarizing;
            let summarized = self.fetch.summarize_all(source, &mut articles);
            info!(source = %source.name, summarized, "Summaries generated");
        }

        outcome.stage = Stage::Deduplicating;
        outcome.new_articles = self.deduplicate(source, articles, now, outcome);
        outcome.new = outcome.new_articles.len();
        info!(source = %source.name, new = outcome.new, "New articles");

        let Some(notifier) = &self.notifier else {
            return Ok(());
        };
        if outcome.new_articles.is_empty() {
            return Ok(());
        }

        outcome.stage = Stage::Delivering;
        match notifier.deliver(&outcome.new_articles) {
            Ok(report) => outcome.delivered = report.sent,
            Err(FeederError::DeliveryAborted { sent, reason }) => {
                outcome.delivered = sent;
                return Err(FeederError::DeliveryAborted { sent, reason });
            }
            Err(e) => return Err(e),
        }

        self.export(source, &outcome.new_articles);
        Ok(())
    }

    /// Store failures degrade to an empty batch: a missed notification beats a duplicate one.
    fn deduplicate(
        &self,
        source: &SourceConfig,
        articles: Vec<Article>,
        now: DateTime<Utc>,
        outcome: &mut SourceOutcome,
    ) -> Vec<Article> {
        let result = if self.is_dry_run() {
            self.dedup.preview(&articles, now)
        } else {
            self.dedup.filter_and_record(articles, now)
        };

        result.unwrap_or_else(|e| {
            warn!(source = %source.name, error = %e, "Seen store unavailable, skipping batch");
            outcome.store_degraded = true;
            Vec::new()
        })
    }

    fn export(&self, source: &SourceConfig, articles: &[Article]) {
        let Some(exporter) = &self.exporter else {
            return;
        };

        match exporter.append(articles) {
            Ok(rows) => info!(source = %source.name, rows, path = %exporter.path().display(), "Exported articles"),
            Err(e) => warn!(source = %source.name, error = %e, "Export failed"),
        }
    }
}
