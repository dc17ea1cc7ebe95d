use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::info;

use cyberfeed::cli::{Cli, Commands};
use cyberfeed::config::{load_feed_config, Config};
use cyberfeed::domain::FeedConfig;
use cyberfeed::logging::{init_logging, log_file_prefix};
use cyberfeed::server::{self, AppState};
use cyberfeed::services::{
    CsvExporter, DedupService, FetchService, NotificationService, PipelineService, RunReport,
};
use cyberfeed::sources::HttpFetcher;
use cyberfeed::storage::JsonSeenStore;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env();
    let _log_guard = init_logging(&config.log_dir)?;
    info!(log = %log_file_prefix(&config.log_dir).display(), "Logging initialised");

    let feed = load_feed_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Run { dry_run } => cmd_run(&config, feed, dry_run),
        Commands::Fetch { json } => cmd_fetch(feed, json),
        Commands::Serve { port } => cmd_serve(feed, port),
        Commands::Sources => cmd_sources(&feed),
    }
}

fn cmd_run(config: &Config, feed: FeedConfig, dry_run: bool) -> anyhow::Result<()> {
    let dedup = DedupService::new(JsonSeenStore::new(config.seen_store_path()));

    if dry_run {
        let fetch = FetchService::new(HttpFetcher::new()?, feed);
        let pipeline: PipelineService<_, _, NotificationService> =
            PipelineService::dry_run(fetch, dedup);

        println!("Fetching sources (dry run)...\n");
        let report = pipeline.run(Utc::now());
        print_report(&report, true);
        println!(
            "Dry run complete. Would deliver {} articles.",
            report.total_new()
        );
        return Ok(());
    }

    let notifier = NotificationService::new(config.require_webhook_url()?)?;
    let fetch = FetchService::new(HttpFetcher::new()?, feed);
    let pipeline = PipelineService::new(fetch, dedup, notifier)
        .with_exporter(CsvExporter::new(config.export_path()));

    println!("Fetching sources...\n");
    let report = pipeline.run(Utc::now());
    print_report(&report, false);
    println!("Delivered {} articles.", report.total_delivered());

    Ok(())
}

fn print_report(report: &RunReport, dry_run: bool) {
    for outcome in &report.outcomes {
        println!(
            "{}: {} extracted, {} new, {} delivered",
            outcome.source, outcome.extracted, outcome.new, outcome.delivered
        );

        let marker = if dry_run { "[DRY RUN]" } else { "+" };
        for article in &outcome.new_articles {
            println!("  {} {} ({})", marker, article.title, article.link);
        }

        if outcome.store_degraded {
            println!("  ! seen store unavailable, nothing treated as new");
        }
        if let Some(error) = &outcome.error {
            println!("  ! failed while {:?}: {}", outcome.stage, error);
        }
        println!();
    }
}

fn cmd_fetch(feed: FeedConfig, json: bool) -> anyhow::Result<()> {
    let service = FetchService::new(HttpFetcher::new()?, feed);
    let articles = service.fetch_all();

    if json {
        let body = serde_json::json!({ "articles": articles });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    for article in &articles {
        println!("{}", article.title);
        println!("  Link: {}", article.link);
        if let Some(category) = &article.category {
            println!("  Category: {}", category);
        }
        if let Some(date) = &article.published_date {
            println!("  Published: {}", date);
        }
        if let Some(summary) = &article.summary {
            println!("  Summary: {}", summary);
        }
        println!();
    }

    println!("Fetched {} articles.", articles.len());
    Ok(())
}

fn cmd_serve(feed: FeedConfig, port: u16) -> anyhow::Result<()> {
    // The blocking client must be created and dropped outside the runtime
    let fetch = Arc::new(FetchService::new(HttpFetcher::new()?, feed));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    println!("Serving news on http://0.0.0.0:{}/news", port);
    runtime.block_on(server::serve(port, AppState::new(Arc::clone(&fetch))))?;
    drop(runtime);

    Ok(())
}

fn cmd_sources(feed: &FeedConfig) -> anyhow::Result<()> {
    if feed.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Configured sources:\n");
    for source in &feed.sources {
        println!("  {}", source.name);
        println!("    URL: {}", source.url);
        println!(
            "    Selectors: article '{}', title '{}'",
            source.article_selector, source.title_selector
        );
        if !source.exclude_sponsored {
            println!("    Sponsored content included");
        }
        println!();
    }

    println!(
        "Max {} articles per source, checked every {}s.",
        feed.max_articles, feed.check_interval
    );
    Ok(())
}
