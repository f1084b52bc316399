mod bootstrap;
mod handlers;
mod server;
mod sweeper_task;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lineup_core::sweeper::{AutoLockSweeper, SweepReport, SweeperConfig};
use lineup_core::window::DueWindow;

use crate::bootstrap::{create_manager, load_directory, StartupError};

#[derive(Parser)]
#[command(
    name = "lineup",
    about = "Lineup — match-day squad selection with automatic kickoff locking",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BackendArgs {
    /// Storage backend: "memory" or "sqlite:<path>"
    #[arg(long, default_value = "memory", env = "LINEUP_STORAGE")]
    storage: String,

    /// JSON file with coaches, fixtures and players
    #[arg(long, env = "LINEUP_SEED")]
    seed: Option<PathBuf>,
}

/// Upper bound for the lead and grace settings: one week.
const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Args)]
struct WindowArgs {
    /// Seconds before kickoff at which drafts become due
    #[arg(
        long,
        default_value = "60",
        env = "LINEUP_LEAD_SECS",
        value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_SECS)
    )]
    lead_secs: u32,

    /// Seconds after kickoff during which drafts are still locked
    #[arg(
        long,
        default_value = "1800",
        env = "LINEUP_GRACE_SECS",
        value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_SECS)
    )]
    grace_secs: u32,

    /// Also lock drafts whose window was missed entirely
    #[arg(long, env = "LINEUP_CATCH_UP")]
    catch_up: bool,
}

impl WindowArgs {
    fn into_config(self, interval: Duration) -> SweeperConfig {
        SweeperConfig {
            interval,
            window: DueWindow::new(
                chrono::Duration::seconds(i64::from(self.lead_secs)),
                chrono::Duration::seconds(i64::from(self.grace_secs)),
            ),
            catch_up: self.catch_up,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the auto-lock sweeper
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3200")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Seconds between sweep cycles
        #[arg(long, default_value = "60", env = "LINEUP_SWEEP_INTERVAL_SECS")]
        sweep_interval_secs: u64,

        /// Maximum number of in-flight HTTP requests
        #[arg(long, default_value = "256")]
        max_concurrency: usize,
    },

    /// Run a single auto-lock sweep now and print the report
    Sweep {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            backend,
            window,
            sweep_interval_secs,
            max_concurrency,
        } => {
            server::run(server::ServeOptions {
                host,
                port,
                storage: backend.storage,
                seed: backend.seed,
                sweeper: window.into_config(Duration::from_secs(sweep_interval_secs.max(1))),
                max_concurrency: max_concurrency.max(1),
            })
            .await
        }
        Commands::Sweep { backend, window } => {
            sweep_once(backend, window, chrono::Local::now().naive_local()).map(|report| {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!(error = %e, "Failed to encode sweep report"),
                }
            })
        }
        Commands::Version => {
            println!("lineup {}", env!("CARGO_PKG_VERSION"));
            println!("Match-day lineup service with kickoff auto-lock");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn sweep_once(
    backend: BackendArgs,
    window: WindowArgs,
    now: NaiveDateTime,
) -> Result<SweepReport, StartupError> {
    let directory = load_directory(backend.seed.as_deref())?;
    let manager = Arc::new(create_manager(&backend.storage, directory)?);
    let sweeper = AutoLockSweeper::new(manager, window.into_config(Duration::from_secs(60)));

    Ok(sweeper.sweep(now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::types::LineupStatus;

    fn window_args(args: &[&str]) -> Result<WindowArgs, clap::Error> {
        let argv = ["lineup", "sweep"].iter().chain(args).copied();
        match Cli::try_parse_from(argv)?.command {
            Commands::Sweep { window, .. } => Ok(window),
            _ => unreachable!("parsed a sweep command"),
        }
    }

    #[test]
    fn test_window_flags_reject_negative_and_oversized_values() {
        assert!(window_args(&["--lead-secs=-5"]).is_err());
        assert!(window_args(&["--grace-secs", "604801"]).is_err());
        assert!(window_args(&["--lead-secs", "99999999999999"]).is_err());

        let window = window_args(&["--lead-secs", "604800", "--grace-secs", "0"]).unwrap();
        let config = window.into_config(Duration::from_secs(60));
        assert_eq!(config.window.lead(), chrono::Duration::weeks(1));
        assert_eq!(config.window.grace(), chrono::Duration::zero());
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sweep_command_locks_drafts_in_shared_database() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"{
                "coaches": [{"id": 1, "team_id": 10}],
                "fixtures": [{"id": 100, "date": "2026-10-14", "time": "15:00:00", "home_team_id": 10, "away_team_id": 20}],
                "players": [
                    {"id": 3, "team_id": 10, "name": "C"},
                    {"id": 1, "team_id": 10, "name": "A"},
                    {"id": 2, "team_id": 10, "name": "B"}
                ]
            }"#,
        )
        .unwrap();
        let storage = format!("sqlite:{}", dir.path().join("lineups.db").display());

        // A server process left an empty draft behind.
        let directory = load_directory(Some(&seed)).unwrap();
        let server = create_manager(&storage, directory.clone()).unwrap();
        let draft = server.submit_lineup(1, 100, vec![], None).unwrap();

        let kickoff = chrono::NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|d| d.and_hms_opt(15, 0, 0))
            .unwrap();
        let backend = BackendArgs {
            storage: storage.clone(),
            seed: Some(seed.clone()),
        };
        let window = window_args(&[]).unwrap();
        let report = sweep_once(backend, window, kickoff).unwrap();

        assert_eq!(report.examined, 1);
        assert_eq!(report.locked, vec![draft.id.clone()]);
        assert_eq!(report.auto_filled, vec![draft.id]);

        let stored = server.get_lineup(1, 100).unwrap();
        assert_eq!(stored.status, LineupStatus::Locked);
        assert_eq!(stored.starting_player_ids, vec![1, 2, 3]);
        assert_eq!(
            server.submit_lineup(1, 100, vec![1], None).unwrap_err().kind(),
            lineup_core::error::ErrorKind::Conflict
        );
    }
}
