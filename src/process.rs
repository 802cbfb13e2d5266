//! Delegation to the ETL engine binary.
//!
//! The entrypoint never implements engine behavior itself; it hands control
//! to the engine binary and faithfully relays the child's exit status. The
//! child inherits stdin/stdout/stderr, so its output reaches the container
//! logs untouched.

use crate::error::{EntrypointError, EntrypointResult};
use tokio::process::Command;
use tracing::info;

/// Path of the engine binary inside the container image.
pub const ETL_BINARY_PATH: &str = "./target/release/helium_etl_lite";

/// Run `binary` with `args` and wait for it to finish.
///
/// There is no timeout on the wait; for the `start` subcommand the child is
/// the long-lived service and runs until it exits on its own.
///
/// # Errors
///
/// - Configuration error if the binary cannot be spawned at all.
/// - [`EntrypointError::SubprocessError`] carrying the child's exit code on
///   any non-zero exit. The orchestrator's `main` mirrors that code as the
///   process exit code.
pub async fn delegate(binary: &str, args: &[&str]) -> EntrypointResult<()> {
    info!(binary, ?args, "Delegating to engine binary");

    let status = Command::new(binary).args(args).status().await.map_err(|e| {
        EntrypointError::config(
            format!("Failed to spawn engine binary {binary}"),
            Some(Box::new(e)),
        )
    })?;

    if status.success() {
        return Ok(());
    }

    let subcommand = args.first().copied().unwrap_or(binary);
    Err(EntrypointError::subprocess(subcommand, status.code()))
}
