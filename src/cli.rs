//! Command-line interface and orchestration for the ETL entrypoint.
//!
//! This module owns both the clap command surface and the sequencing of the
//! orchestration states behind each subcommand.
//!
//! # Commands
//!
//! - `run`: full bootstrap, then hand off to the engine's `start`
//! - `migrate`: bootstrap, then hand off to the engine's `migrate`
//! - `write_config`: only resolve secrets and write the settings file
//!
//! # Example
//!
//! ```bash
//! # Normal container entrypoint invocation
//! etl-lite-entrypoint run --migrate
//!
//! # Render settings.toml without touching the network
//! etl-lite-entrypoint write_config --mode filters
//! ```

use crate::config::{DbInfo, ServiceInfo};
use crate::error::{EntrypointError, EntrypointResult};
use crate::filters::{self, SeedOutcome};
use crate::probe;
use crate::process::{self, ETL_BINARY_PATH};
use crate::settings::{EtlSettings, Mode, SETTINGS_FILE_PATH};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Retry budget the orchestrator grants each dependency probe.
const PROBE_RETRIES: u32 = 5;

/// Sleep between orchestrator probe attempts.
const PROBE_SLEEP: Duration = Duration::from_secs(5);

/// Helium ETL Lite container entrypoint
#[derive(Parser, Debug)]
#[command(name = "etl-lite-entrypoint")]
#[command(about = "Helium ETL Lite AWS Copilot entrypoint", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ETL service
    Run {
        /// Run migrations before starting ETL
        #[arg(short, long)]
        migrate: bool,

        /// Scan the node for the oldest block it has and start loading
        /// transactions from there
        #[arg(short, long, default_value_t = true)]
        backfill: bool,

        /// Mode to run the blockchain follower in
        #[arg(short = 'M', long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,
    },

    /// Run database migrations for the ETL service
    Migrate {
        /// Scan the node for the oldest block it has and start loading
        /// transactions from there
        #[arg(short, long, default_value_t = true)]
        backfill: bool,

        /// Mode to run the blockchain follower in
        #[arg(short = 'M', long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,
    },

    /// Write the engine settings file and exit
    #[command(name = "write_config")]
    WriteConfig {
        /// Scan the node for the oldest block it has and start loading
        /// transactions from there
        #[arg(short, long, default_value_t = true)]
        backfill: bool,

        /// Mode to run the blockchain follower in
        #[arg(short = 'M', long, value_enum, default_value_t = Mode::Full)]
        mode: Mode,
    },
}

/// Parse CLI arguments and execute the appropriate command.
///
/// Invoked with no subcommand, prints usage and returns successfully (the
/// container treats that as exit 0).
///
/// # Errors
///
/// Returns the first fatal error of the executed sequence; nothing after a
/// fatal error runs.
pub async fn run() -> EntrypointResult<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            Cli::command().print_help().map_err(|e| {
                EntrypointError::config("Failed to print usage", Some(Box::new(e)))
            })?;
            Ok(())
        }
        Some(Commands::Run {
            migrate,
            backfill,
            mode,
        }) => run_service(migrate, backfill, mode).await,
        Some(Commands::Migrate { backfill, mode }) => run_migrations(backfill, mode).await,
        Some(Commands::WriteConfig { backfill, mode }) => write_config(backfill, mode),
    }
}

/// Resolve secrets, synthesize settings, and write the settings file.
///
/// Shared prefix of every subcommand; any error here aborts the invocation
/// before network or database work starts.
fn prepare(mode: Mode, backfill: bool) -> EntrypointResult<(ServiceInfo, EtlSettings)> {
    let info = ServiceInfo::from_env()?;
    let settings = EtlSettings::new(&info, mode, backfill);
    settings.write_to_file(Path::new(SETTINGS_FILE_PATH))?;
    Ok((info, settings))
}

/// Probe both dependencies with the operational retry budget.
///
/// Database first, then blockchain node, strictly in that order.
async fn probe_dependencies(info: &ServiceInfo) -> EntrypointResult<()> {
    probe::probe_with_retry(
        info.db().host(),
        info.db().port(),
        PROBE_RETRIES,
        PROBE_SLEEP,
        probe::DEFAULT_CONNECT_TIMEOUT,
    )
    .await?;

    probe::probe_with_retry(
        info.node().host(),
        info.node().port(),
        PROBE_RETRIES,
        PROBE_SLEEP,
        probe::DEFAULT_CONNECT_TIMEOUT,
    )
    .await?;

    println!("{}", "Dependencies are reachable".green());
    Ok(())
}

/// Execute the `run` command: bootstrap and hand off to `start`.
async fn run_service(migrate: bool, backfill: bool, mode: Mode) -> EntrypointResult<()> {
    let (info, settings) = prepare(mode, backfill)?;
    probe_dependencies(&info).await?;
    launch_engine(info.db(), settings.mode(), ETL_BINARY_PATH, migrate).await
}

/// Post-readiness phase of `run`: optional migration, filter seeding, and
/// the final hand-off to the engine's `start` subcommand.
///
/// The engine binary path is a parameter so the abort ordering can be
/// exercised against a stub binary: a failed migration must prevent both
/// filter seeding and the `start` delegation.
///
/// # Errors
///
/// Returns the first fatal error of the sequence. A failed `migrate`
/// delegation aborts before any seeding happens; `start` must never see a
/// half-migrated schema.
pub async fn launch_engine(
    db: &DbInfo,
    mode: Mode,
    engine_binary: &str,
    migrate: bool,
) -> EntrypointResult<()> {
    if migrate {
        process::delegate(engine_binary, &["migrate"]).await?;
    }

    if filters::seed_filters(db, mode).await? == SeedOutcome::Skipped {
        info!("No filter data supplied, nothing seeded");
    }

    println!("{}", "Starting ETL engine".cyan().bold());
    process::delegate(engine_binary, &["start"]).await
}

/// Execute the `migrate` command: bootstrap and hand off to `migrate`.
async fn run_migrations(backfill: bool, mode: Mode) -> EntrypointResult<()> {
    let (info, settings) = prepare(mode, backfill)?;
    probe_dependencies(&info).await?;

    if filters::seed_filters(info.db(), settings.mode()).await? == SeedOutcome::Skipped {
        info!("No filter data supplied, nothing seeded");
    }

    process::delegate(ETL_BINARY_PATH, &["migrate"]).await
}

/// Execute the `write_config` command: settings file only, no network I/O.
fn write_config(backfill: bool, mode: Mode) -> EntrypointResult<()> {
    prepare(mode, backfill)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = vec!["etl-lite-entrypoint", "run"];
        let cli = Cli::try_parse_from(args);
        assert!(cli.is_ok());

        let args = vec!["etl-lite-entrypoint", "migrate"];
        let cli = Cli::try_parse_from(args);
        assert!(cli.is_ok());

        let args = vec!["etl-lite-entrypoint", "write_config"];
        let cli = Cli::try_parse_from(args);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(vec!["etl-lite-entrypoint"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(vec!["etl-lite-entrypoint", "run"]).expect("parses");

        if let Some(Commands::Run {
            migrate,
            backfill,
            mode,
        }) = cli.command
        {
            assert!(!migrate);
            assert!(backfill);
            assert_eq!(mode, Mode::Full);
        } else {
            panic!("expected run command");
        }
    }

    #[test]
    fn test_run_with_migrate_flag() {
        let cli =
            Cli::try_parse_from(vec!["etl-lite-entrypoint", "run", "--migrate"]).expect("parses");

        if let Some(Commands::Run { migrate, .. }) = cli.command {
            assert!(migrate);
        } else {
            panic!("expected run command");
        }
    }

    #[test]
    fn test_mode_flag() {
        let cli = Cli::try_parse_from(vec![
            "etl-lite-entrypoint",
            "write_config",
            "--mode",
            "rewards",
        ])
        .expect("parses");

        if let Some(Commands::WriteConfig { mode, .. }) = cli.command {
            assert_eq!(mode, Mode::Rewards);
        } else {
            panic!("expected write_config command");
        }
    }

    #[test]
    fn test_short_mode_flag() {
        let cli = Cli::try_parse_from(vec!["etl-lite-entrypoint", "migrate", "-M", "filters"])
            .expect("parses");

        if let Some(Commands::Migrate { mode, .. }) = cli.command {
            assert_eq!(mode, Mode::Filters);
        } else {
            panic!("expected migrate command");
        }
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let cli = Cli::try_parse_from(vec!["etl-lite-entrypoint", "run", "--mode", "sideways"]);
        assert!(cli.is_err());
    }
}
