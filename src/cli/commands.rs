use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cyberfeed")]
#[command(about = "Security news scraper with webhook notifications")]
#[command(version)]
pub struct Cli {
    /// Feed configuration file (JSON)
    #[arg(long, global = true, env = "CYBERFEED_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every source and deliver new articles to the webhook
    Run {
        /// Dry run - don't send notifications or record articles, just show what would be sent
        #[arg(long)]
        dry_run: bool,
    },

    /// Scrape every source and print the articles without delivering them
    Fetch {
        /// Print the articles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the latest articles over HTTP at /news
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 8000)]
        port: u16,
    },

    /// List configured sources
    Sources,
}
