//! goalstream-ingest - NHL goal ingestion and ranking pipeline
//!
//! Pulls finished games from the NHL web API, reconstructs and ranks
//! every goal, and publishes them to per-team and league-wide activity
//! feeds. Progress is checkpointed per date in a JSON blob store so
//! runs are incremental and idempotent.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use goalstream_common::IngestConfig;
use goalstream_ingest::services::{HttpBlobStore, HttpFeedClient, NhlApiClient};
use goalstream_ingest::startup::run_startup_check;
use goalstream_ingest::Orchestrator;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "goalstream-ingest", version, about = "NHL goal ingestion and ranking pipeline")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, env = "GOALSTREAM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Catch up from the day after the last completed date through today
    CatchUp,
    /// Process an explicit inclusive date range (dates as YYYY-MM-DD)
    Range {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Reprocess dates already marked completed
        #[arg(long)]
        force: bool,
    },
    /// Re-check the recent window for late corrections
    Check {
        /// Days before today to include (default from configuration)
        #[arg(long)]
        days_back: Option<u32>,
        /// Reprocess dates already marked completed
        #[arg(long)]
        force: bool,
    },
    /// Run the startup catch-up check, recording status to the blob store
    Startup {
        #[arg(long)]
        days_back: Option<u32>,
    },
    /// Forget one date's checkpoint status so it is re-ingested
    Reset {
        #[arg(long)]
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    info!("Starting goalstream-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = IngestConfig::load(cli.config.as_deref())?;

    let source = NhlApiClient::new(
        &config.event_source_base_url,
        config.http_timeout,
        config.per_game_delay,
    )?;
    let blobs = HttpBlobStore::new(&config.blob_store_base_url, config.http_timeout)?;
    let feeds = HttpFeedClient::new(
        &config.feed_base_url,
        config.feed_api_key.clone(),
        config.http_timeout,
    )?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, finishing the date in flight");
                cancel.cancel();
            }
        });
    }

    let default_days_back = config.startup_days_back;
    let orchestrator =
        Orchestrator::new(source, blobs, feeds, config).with_cancellation(cancel);

    let summary = match cli.command {
        Command::CatchUp => orchestrator.run_to_today().await?,
        Command::Range { from, to, force } => orchestrator.run_range(from, to, force).await?,
        Command::Check { days_back, force } => {
            orchestrator
                .check_recent(days_back.unwrap_or(default_days_back), force)
                .await?
        }
        Command::Startup { days_back } => {
            run_startup_check(&orchestrator, days_back.unwrap_or(default_days_back)).await?
        }
        Command::Reset { date } => {
            orchestrator.reset_date(date).await?;
            return Ok(());
        }
    };

    info!(
        dates_checked = summary.dates_checked,
        dates_completed = summary.dates_completed,
        dates_in_progress = summary.dates_in_progress,
        dates_failed = summary.dates_failed,
        goals_found = summary.goals_found,
        goals_published = summary.goals_published,
        duplicates_skipped = summary.duplicates_skipped,
        publish_failures = summary.publish_failures,
        "Run finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
