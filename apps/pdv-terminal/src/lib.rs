//! # PDV Terminal Library
//!
//! Checkout terminal for a single cash drawer. Wires configuration,
//! logging, the local store and the backend client together, then hands
//! stdin to the command loop.
//!
//! ## Module Organization
//! ```text
//! pdv_terminal/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── app.rs          ◄─── State bundle handed to the loop
//! ├── repl.rs         ◄─── Command parsing, rendering, stdin loop
//! ├── state/
//! │   ├── auth.rs     ◄─── Logged-in operator and permission gate
//! │   ├── session.rs  ◄─── The live PdvSession behind a Mutex
//! │   ├── db.rs       ◄─── Snapshot store wrapper
//! │   ├── backend.rs  ◄─── Online/offline backend selection
//! │   └── config.rs   ◄─── Config file + PDV_* overrides
//! ├── commands/
//! │   ├── auth.rs     ◄─── login / logout
//! │   ├── cash.rs     ◄─── open / close / status of the drawer
//! │   ├── cart.rs     ◄─── cart lines and customer
//! │   ├── discount.rs ◄─── discount requests and approvals
//! │   ├── payment.rs  ◄─── tenders and gateway status
//! │   ├── sale.rs     ◄─── finalize and the pending-sale queue
//! │   └── report.rs   ◄─── payment and cash summaries
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod app;
pub mod commands;
pub mod error;
pub mod repl;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use pdv_client::HttpBackend;
use pdv_db::{Database, DbConfig, DbError};
use thiserror::Error;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use state::{BackendState, ConfigError, ConfigState, DbState};

/// Anything that stops the terminal from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not determine app data directory")]
    DataDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Runs the terminal until the operator quits or stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging (stderr, RUST_LOG or the default filter)         │
/// │  2. Load Configuration (PDV_CONFIG file, then PDV_* variables)          │
/// │  3. Determine Database Path                                             │
/// │     • PDV_DB_PATH / database_path when set                              │
/// │     • otherwise the platform data dir, e.g. ~/.local/share/pdv-terminal │
/// │  4. Connect to Database (migrations applied on connect)                 │
/// │  5. Build Backend (HTTP client, or offline-only)                        │
/// │  6. Command Loop on stdin/stdout                                        │
/// │  7. Close the pool                                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    info!("Starting PDV terminal");

    let config = ConfigState::load()?;

    let db_path = get_database_path(&config)?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let backend = build_backend(&config);
    let app = App::new(config, DbState::new(db), backend);

    repl::run_loop(&app, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    app.db.inner().close().await;
    info!("PDV terminal stopped");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so they never interleave with the command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=pdv=trace` - Show trace for pdv crates only
/// - Default: `info,pdv=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pdv=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.pdv.terminal/pdv.db`
/// - **Windows**: `%APPDATA%\pdv\terminal\data\pdv.db`
/// - **Linux**: `~/.local/share/terminal/pdv.db`
///
/// `PDV_DB_PATH` (already folded into the config) takes precedence.
fn get_database_path(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(path) = &config.database_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "pdv", "terminal").ok_or(StartupError::DataDir)?;
    let data_dir = proj_dirs.data_dir();

    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("pdv.db"))
}

/// Builds the backend pair for the configured mode.
///
/// A client that cannot be built leaves the terminal offline-only rather
/// than refusing to start.
fn build_backend(config: &ConfigState) -> BackendState {
    if config.offline {
        info!("Offline mode configured; backend calls disabled");
        return BackendState::offline_only();
    }

    match HttpBackend::new(&config.client_config()) {
        Ok(backend) => {
            info!(api_url = %config.api_url, "Backend client ready");
            BackendState::new(Arc::new(backend))
        }
        Err(e) => {
            warn!(error = %e, "Could not build backend client; running offline");
            BackendState::offline_only()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_database_path_wins() {
        let config = ConfigState {
            database_path: Some(PathBuf::from("/tmp/pdv-test.db")),
            ..ConfigState::default()
        };
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/tmp/pdv-test.db")
        );
    }

    #[test]
    fn test_offline_config_has_no_online_backend() {
        let config = ConfigState {
            offline: true,
            ..ConfigState::default()
        };
        assert!(!build_backend(&config).has_online());
    }

    #[test]
    fn test_default_config_builds_http_backend() {
        assert!(build_backend(&ConfigState::default()).has_online());
    }
}
