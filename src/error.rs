//! Error types for the ETL entrypoint orchestrator.
//!
//! This module provides a unified error type [`EntrypointError`] covering
//! every failure the entrypoint can hit between container start and the
//! hand-off to the engine binary.
//!
//! # Design
//!
//! The error hierarchy is organized by orchestration stage:
//! - [`EntrypointError::ConfigError`]: secret payload and settings issues
//! - [`EntrypointError::UnreachableError`]: readiness probe budget exhausted
//! - [`EntrypointError::DatabaseError`]: filter seeding failures
//! - [`EntrypointError::SubprocessError`]: delegated engine binary failed
//!
//! All errors implement [`std::error::Error`] and include context via the
//! source error chain. [`EntrypointError::exit_code`] maps each kind to the
//! process exit code the entrypoint must terminate with.
//!
//! # Example
//!
//! ```
//! use etl_lite_entrypoint::error::{EntrypointError, EntrypointResult};
//!
//! fn require_value(value: Option<&str>) -> EntrypointResult<&str> {
//!     value.ok_or_else(|| EntrypointError::config("value is not set", None))
//! }
//! ```

use std::fmt;

/// Result type alias using [`EntrypointError`].
pub type EntrypointResult<T> = Result<T, EntrypointError>;

/// Unified error type for the entrypoint orchestrator.
///
/// This enum encompasses all error types that can occur during:
/// - Secret payload resolution
/// - Settings synthesis and file write
/// - Dependency readiness probing
/// - Filter seeding
/// - Engine subprocess delegation
#[derive(Debug)]
pub enum EntrypointError {
    /// Secret payload or settings errors.
    ///
    /// Variants include:
    /// - Missing credential environment variable
    /// - Malformed secret JSON or missing required key
    /// - Invalid engine mode
    /// - Settings serialization or file write failures
    ConfigError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A dependency never became reachable within the retry budget.
    ///
    /// Raised by the readiness prober after every attempt failed.
    UnreachableError {
        /// Hostname that was probed
        host: String,
        /// Port that was probed
        port: u16,
        /// Number of connection attempts made
        attempts: u32,
    },

    /// Database errors during filter seeding.
    ///
    /// Variants include:
    /// - Connection failures
    /// - Insert execution errors
    DatabaseError {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The delegated engine binary terminated unsuccessfully.
    ///
    /// The entrypoint mirrors the child's exit code as its own.
    SubprocessError {
        /// Subcommand the engine was invoked with (`migrate` or `start`)
        subcommand: String,
        /// Exit code of the child, when one exists. `None` means the child
        /// was terminated by a signal and never produced a code.
        code: Option<i32>,
    },
}

impl EntrypointError {
    /// Create a new configuration error.
    ///
    /// # Example
    ///
    /// ```
    /// use etl_lite_entrypoint::error::EntrypointError;
    ///
    /// let err = EntrypointError::config("FLAVORSCLUSTER_SECRET not set", None);
    /// assert!(matches!(err, EntrypointError::ConfigError { .. }));
    /// ```
    #[must_use]
    pub fn config(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source,
        }
    }

    /// Create a new unreachable-dependency error.
    ///
    /// # Example
    ///
    /// ```
    /// use etl_lite_entrypoint::error::EntrypointError;
    ///
    /// let err = EntrypointError::unreachable("db", 5432, 5);
    /// assert!(matches!(err, EntrypointError::UnreachableError { .. }));
    /// ```
    #[must_use]
    pub fn unreachable(host: impl Into<String>, port: u16, attempts: u32) -> Self {
        Self::UnreachableError {
            host: host.into(),
            port,
            attempts,
        }
    }

    /// Create a new database error.
    ///
    /// # Example
    ///
    /// ```
    /// use etl_lite_entrypoint::error::EntrypointError;
    ///
    /// let err = EntrypointError::database("Connection failed", None);
    /// assert!(matches!(err, EntrypointError::DatabaseError { .. }));
    /// ```
    #[must_use]
    pub fn database(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source,
        }
    }

    /// Create a new subprocess error.
    ///
    /// # Example
    ///
    /// ```
    /// use etl_lite_entrypoint::error::EntrypointError;
    ///
    /// let err = EntrypointError::subprocess("migrate", Some(2));
    /// assert!(matches!(err, EntrypointError::SubprocessError { .. }));
    /// ```
    #[must_use]
    pub fn subprocess(subcommand: impl Into<String>, code: Option<i32>) -> Self {
        Self::SubprocessError {
            subcommand: subcommand.into(),
            code,
        }
    }

    /// Process exit code this error must terminate the entrypoint with.
    ///
    /// A failed subprocess mirrors the child's exact exit code (1 when the
    /// child died to a signal and produced none); every other failure kind
    /// exits 1.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::SubprocessError { code: Some(c), .. } => *c,
            _ => 1,
        }
    }
}

impl fmt::Display for EntrypointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, .. } => write!(f, "Configuration error: {message}"),
            Self::UnreachableError {
                host,
                port,
                attempts,
            } => {
                write!(
                    f,
                    "Unable to connect to {host}:{port} after {attempts} attempts"
                )
            }
            Self::DatabaseError { message, .. } => write!(f, "Database error: {message}"),
            Self::SubprocessError { subcommand, code } => match code {
                Some(c) => write!(f, "Engine subcommand `{subcommand}` exited with code {c}"),
                None => write!(f, "Engine subcommand `{subcommand}` terminated by signal"),
            },
        }
    }
}

impl std::error::Error for EntrypointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. } | Self::DatabaseError { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &dyn std::error::Error),
            Self::UnreachableError { .. } | Self::SubprocessError { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error() {
        let err = EntrypointError::config("test error", None);
        assert!(matches!(err, EntrypointError::ConfigError { .. }));
        assert_eq!(err.to_string(), "Configuration error: test error");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unreachable_error() {
        let err = EntrypointError::unreachable("db", 5432, 5);
        assert_eq!(
            err.to_string(),
            "Unable to connect to db:5432 after 5 attempts"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_database_error() {
        let err = EntrypointError::database("insert failed", None);
        assert!(matches!(err, EntrypointError::DatabaseError { .. }));
        assert_eq!(err.to_string(), "Database error: insert failed");
    }

    #[test]
    fn test_subprocess_error_mirrors_code() {
        let err = EntrypointError::subprocess("migrate", Some(2));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "Engine subcommand `migrate` exited with code 2"
        );
    }

    #[test]
    fn test_subprocess_error_signal() {
        let err = EntrypointError::subprocess("start", None);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "Engine subcommand `start` terminated by signal"
        );
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = EntrypointError::config("failed to load", Some(Box::new(source)));

        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "Configuration error: failed to load");
    }

    #[test]
    fn test_error_trait() {
        let err = EntrypointError::database("test", None);
        // Ensure it implements Error trait
        let _: &dyn std::error::Error = &err;
    }
}
