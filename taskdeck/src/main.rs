//! `taskdeck`: command-line client for a remote task-management API.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! taskdeck --api-url http://127.0.0.1:3000 signin --username alice
//! taskdeck tasks add "Buy milk" --due 2024-05-01
//! taskdeck tasks list --pending
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::api::ApiClient;
use taskdeck::cli::{self, CliError};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::session::{FileStorage, SessionStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::without_file(&cli)
        }
    };

    // Logs go to a file so stdout carries only command output.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let Some(command) = cli.command else {
        return ExitCode::SUCCESS;
    };

    match execute(command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: cli::Command, config: &ClientConfig) -> Result<(), CliError> {
    let api = ApiClient::new(&config.api_url)?;
    let storage = FileStorage::new(config.session_dir()?);
    tracing::debug!(api = %api.base_url(), dir = %storage.dir().display(), "starting");

    let mut store = SessionStore::hydrate(api, storage);
    let mut stdout = std::io::stdout().lock();
    cli::run(command, &mut store, config, &mut stdout).await
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
