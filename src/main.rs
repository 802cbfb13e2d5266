//! Binary entry point for the ETL entrypoint orchestrator.
//!
//! # Architecture Flow
//!
//! ```text
//! main.rs (Runtime Initialization)
//!     ↓
//! CLI Layer (src/cli.rs)
//!     ↓
//! 1. Config Layer (src/config.rs)     → Resolve secret + node address
//! 2. Settings Layer (src/settings.rs) → Write config/settings.toml
//! 3. Probe Layer (src/probe.rs)       → Wait for db + node
//! 4. Filters Layer (src/filters.rs)   → Seed address allow-lists
//! 5. Process Layer (src/process.rs)   → Delegate to the engine binary
//! ```
//!
//! main.rs itself only initializes the async runtime and tracing, then maps
//! the terminal error to the process exit code. A failed engine subprocess
//! exits with the child's exact code; every other failure exits 1.

use etl_lite_entrypoint::{cli, observability};
use tracing::error;

/// Entry point for the ETL entrypoint orchestrator.
///
/// Initializes:
/// - Tokio async runtime (via `#[tokio::main]`)
/// - Structured logging with tracing
///
/// Then delegates to the CLI module for all orchestration.
#[tokio::main]
async fn main() {
    // Initialize structured logging FIRST (before any other operations).
    // Configuration is controlled via environment variables:
    // - RUST_LOG: Set log level (e.g., "debug", "info")
    // - LOG_JSON: Enable JSON output for production ("true" or "false")
    // - LOG_FILE: Write logs to file with daily rotation
    let log_level = std::env::var("RUST_LOG").ok();
    let log_file = std::env::var("LOG_FILE").ok().map(std::path::PathBuf::from);
    let json_output = std::env::var("LOG_JSON")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    // Hold the file-writer guard for the whole process; dropping it would
    // stop the background writer and lose LOG_FILE output.
    let _log_guard = match observability::init_tracing(log_level, log_file, json_output) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize tracing: {e}");
            std::process::exit(1);
        }
    };

    // Run CLI - all orchestration happens inside cli::run(). The terminal
    // error carries the exit code this process must relay to the platform.
    if let Err(e) = cli::run().await {
        error!(error = %e, "Entrypoint failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
