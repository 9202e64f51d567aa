//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::query;
use crate::domain::Day;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "actionable")]
#[command(author, version, about = "Show which tasks can be worked on right now")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format [default: from config, else text]
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(long, global = true, env = "ACTIONABLE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show tasks available to work on now
    Available {
        /// Only consider tasks whose name or note contains this text
        query: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show why a single task is or is not available
    Explain {
        /// Task ID
        task_id: String,

        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where the tasks come from and which day to evaluate
#[derive(Args)]
pub struct SourceArgs {
    /// Snapshot file exported from the task store
    #[arg(long, env = "ACTIONABLE_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

impl SourceArgs {
    fn snapshot_path(&self, config: &Config) -> Result<PathBuf> {
        self.snapshot
            .clone()
            .or_else(|| config.snapshot.clone())
            .context("No snapshot given. Use --snapshot, set ACTIONABLE_SNAPSHOT, or set `snapshot` in the config file")
    }

    /// The local day to evaluate
    fn day(&self) -> Day {
        match self.today {
            Some(date) => Day::on(&Local, date),
            None => Day::containing(&Local::now()),
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?config, "configuration loaded");

    let output = Output::new(cli.format.unwrap_or(config.default_format));

    match cli.command {
        Commands::Available { query, source } => {
            let snapshot = query::load_snapshot(&source.snapshot_path(&config)?)?;
            query::available(&output, &snapshot, source.day(), query.as_deref())?
        }
        Commands::Explain { task_id, source } => {
            let snapshot = query::load_snapshot(&source.snapshot_path(&config)?)?;
            query::explain(&output, &snapshot, source.day(), &task_id)?
        }
    }

    tracing::debug!("command completed");
    Ok(())
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; `--verbose` turns on debug logs for this crate.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("actionable=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
