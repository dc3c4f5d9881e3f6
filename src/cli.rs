use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{PublisherConfig, DEFAULT_DB_PATH};
use crate::error::LedgerResult;

#[derive(Debug, Parser)]
#[command(
    name = "testledger",
    version,
    about = "Publish test-runner suite results into a durable ledger"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Publish a run document into the ledger.
    Publish(PublishArgs),
    /// List recently stored records.
    Records(RecordsArgs),
    /// Per-status record counts.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Path to the run document JSON, or `-` for stdin.
    #[arg(long)]
    pub input: PathBuf,

    /// Path to the SQLite ledger (overrides the config file).
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Optional JSON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Publish suites built from snapshot versions.
    #[arg(long)]
    pub publish_snapshots: bool,

    /// Validate and count without writing to the ledger.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the publish summary as pretty JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    /// Resolve the effective config: file and environment first, CLI
    /// flags on top.
    pub fn effective_config(&self) -> LedgerResult<PublisherConfig> {
        let mut config = PublisherConfig::load(self.config.as_deref())?;
        if self.publish_snapshots {
            config.publish_snapshots = true;
        }
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct RecordsArgs {
    /// Path to the SQLite ledger.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Maximum number of records to list, newest first.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print records as pretty JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Path to the SQLite ledger.
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Restrict counts to one component.
    #[arg(long)]
    pub component: Option<String>,

    /// Print counts as pretty JSON.
    #[arg(long)]
    pub json: bool,
}
