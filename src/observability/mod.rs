//! Observability and structured logging infrastructure.
//!
//! This module provides structured logging using the tracing framework.
//! The entrypoint is a short-lived bootstrap process, but it runs inside a
//! container platform whose log collector wants the same machine-parseable
//! output as the long-lived services around it.
//!
//! # Usage
//!
//! Initialize tracing at application startup:
//!
//! ```no_run
//! use etl_lite_entrypoint::observability;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize with defaults (pretty console output, info level).
//!     // Keep the returned guard alive when file logging is enabled.
//!     let _guard = observability::init_tracing(None, None, false)?;
//!
//!     // Run application...
//!     Ok(())
//! }
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Set log level for all modules
//! RUST_LOG=debug etl-lite-entrypoint run
//!
//! # Component-specific levels
//! RUST_LOG=etl_lite_entrypoint=debug,sqlx=warn etl-lite-entrypoint run
//!
//! # Enable JSON output for production
//! LOG_JSON=true etl-lite-entrypoint run
//!
//! # Write logs to file with daily rotation
//! LOG_FILE=./logs/entrypoint.log etl-lite-entrypoint run
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the tracing subscriber with configurable output formats.
///
/// # Arguments
///
/// * `log_level` - Optional log level override (e.g., "debug", "info").
///   Falls back to the RUST_LOG environment variable.
/// * `log_file` - Optional file path for log output. Enables daily log
///   rotation.
/// * `json_output` - If true, outputs JSON suitable for log aggregation.
///   If false, uses a human-readable format.
///
/// # Defaults
///
/// When no configuration is provided:
/// - Level: `info` for this crate, `warn` for dependencies
/// - Format: Pretty-printed console output, no file
///
/// # Returns
///
/// The worker guard backing the non-blocking file writer when file logging
/// is enabled. The caller must keep it alive for the process lifetime;
/// dropping it stops the background writer and loses file output.
///
/// # Errors
///
/// Returns an error if the log file directory cannot be created or the
/// subscriber fails to initialize.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    // Build environment filter from RUST_LOG or provided level
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        // Default: info for our app, warn for dependencies to keep sqlx
        // quiet during filter seeding
        EnvFilter::new("etl_lite_entrypoint=info,warn")
    };

    // Console layer (stdout)
    let console_layer = if json_output {
        // Production: JSON output for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        // Development: human-readable colored output
        fmt::layer().pretty().with_target(true).boxed()
    };

    // File layer (optional). The worker guard is handed back to the
    // caller; the non-blocking writer shuts down when it drops.
    let mut file_guard = None;
    let file_layer = if let Some(ref path) = log_file {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create rolling file appender (rotates daily)
        let file_appender = tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name().unwrap_or_else(|| OsStr::new("app.log")),
        );

        // Non-blocking writer for better performance
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        // File always uses JSON for structured log analysis
        Some(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .boxed(),
        )
    } else {
        None
    };

    // Build subscriber with layers
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // Add file layer if configured. try_init so a second initialization
    // (e.g. from tests) surfaces as an error instead of a panic.
    if let Some(file) = file_layer {
        subscriber.with(file).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(file_guard)
}
