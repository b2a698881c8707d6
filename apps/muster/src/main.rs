//! muster - converges a directory service's user accounts toward the HR
//! roster extract.
//!
//! `muster run` performs one reconciliation pass (dry-run unless applying is
//! enabled); `muster check` verifies connectivity to both endpoints without
//! reconciling.

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;

use config::Config;
use error::{JobError, JobResult};
use muster_core::{ExpiryAware, RosterOnly, SuspensionPolicy};
use muster_directory::DirectoryClient;
use muster_engine::{ApplyMode, RunController, RunSettings};
use muster_roster::{ReportAdapter, RosterClient};

/// Roster-to-directory reconciliation job
#[derive(Parser)]
#[command(name = "muster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform one reconciliation pass
    Run(RunArgs),

    /// Verify connectivity to the roster and directory endpoints
    Check(CheckArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Compute and log mutations without applying them (overrides MUSTER_APPLY)
    #[arg(long)]
    dry_run: bool,

    /// Apply mutations (overrides MUSTER_APPLY)
    #[arg(long, conflicts_with = "dry_run")]
    apply: bool,

    /// Failsafe cap on mutations per run
    #[arg(long, env = "MUSTER_CHANGE_LIMIT")]
    change_limit: Option<u64>,

    /// Minimum roster size required to reconcile
    #[arg(long, env = "MUSTER_MIN_SAFE_USERS")]
    min_safe_users: Option<usize>,
}

#[derive(Args)]
struct CheckArgs {}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> JobResult<()> {
    match cli.command {
        Commands::Run(args) => execute_run(args).await,
        Commands::Check(_) => execute_check().await,
    }
}

async fn execute_run(args: RunArgs) -> JobResult<()> {
    let mut config = Config::load()?;
    if args.dry_run {
        config.apply = false;
    } else if args.apply {
        config.apply = true;
    }
    if let Some(limit) = args.change_limit {
        config.change_limit = limit;
    }
    if let Some(min) = args.min_safe_users {
        config.min_safe_users = min;
    }

    let roster_client = RosterClient::new(
        &config.roster_uri,
        &config.roster_user,
        &config.roster_password,
    )?;
    let entries = roster_client.fetch().await?;
    let adapter = ReportAdapter::new(&config.email_field);
    let raw_roster = adapter.adapt_all(&entries);

    let directory = DirectoryClient::new(&config.directory_base_uri, &config.directory_token)?;

    let policy: Box<dyn SuspensionPolicy> = if config.honor_expiry {
        Box::new(ExpiryAware)
    } else {
        Box::new(RosterOnly)
    };
    let settings = RunSettings {
        failsafe_change_limit: config.change_limit,
        min_safe_user_count: config.min_safe_users,
        org_units: config.org_units.clone(),
        apply_email_updates: config.apply_email_updates,
        mode: if config.apply {
            ApplyMode::Apply
        } else {
            ApplyMode::DryRun
        },
    };

    let report = RunController::new(settings, policy)
        .run(raw_roster, &directory)
        .await;
    report.log_summary();

    if report.exit_code() == 0 {
        Ok(())
    } else {
        Err(JobError::RunFailed)
    }
}

async fn execute_check() -> JobResult<()> {
    let config = Config::load()?;

    let roster_client = RosterClient::new(
        &config.roster_uri,
        &config.roster_user,
        &config.roster_password,
    )?;
    let entries = roster_client.fetch().await?;
    info!(count = entries.len(), "roster endpoint reachable");

    let directory = DirectoryClient::new(&config.directory_base_uri, &config.directory_token)?;
    directory.test_connection().await?;
    info!("directory endpoint reachable");

    Ok(())
}
