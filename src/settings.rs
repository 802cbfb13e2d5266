//! Synthesis of the `settings.toml` file consumed by the ETL engine.
//!
//! The engine reads its configuration from a TOML file at a fixed path
//! relative to the container WORKDIR. This module builds that document from
//! the resolved [`ServiceInfo`](crate::config::ServiceInfo) and the CLI
//! flags, and writes it exactly once per invocation.
//!
//! The `backfill` key is deliberately rendered as the string literal
//! `"true"`/`"false"` rather than a TOML boolean; that is the shape the
//! engine expects.

use crate::config::ServiceInfo;
use crate::error::{EntrypointError, EntrypointResult};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Path of the generated settings file, relative to the container WORKDIR.
pub const SETTINGS_FILE_PATH: &str = "./config/settings.toml";

/// Directory the engine writes its own logs to.
pub const ETL_LOG_DIR: &str = "/opt/etl-lite";

/// Subset of blockchain data the engine processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Follow every block, transaction, and reward.
    Full,
    /// Follow only the account/gateway addresses seeded into `filters`.
    Filters,
    /// Follow reward activity only.
    Rewards,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Full
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Filters => write!(f, "filters"),
            Self::Rewards => write!(f, "rewards"),
        }
    }
}

impl FromStr for Mode {
    type Err = EntrypointError;

    /// Parse a mode name, rejecting anything outside the allowed set.
    ///
    /// The CLI already constrains the flag via `ValueEnum`; this exists for
    /// callers arriving with a plain string, and fails before any file or
    /// network I/O can happen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "filters" => Ok(Self::Filters),
            "rewards" => Ok(Self::Rewards),
            other => Err(EntrypointError::config(
                format!("Mode {other} invalid, must be one of full, filters, rewards"),
                None,
            )),
        }
    }
}

/// Nested `[log]` table of the settings document.
#[derive(Debug, Clone, Serialize)]
struct LogSettings {
    log_dir: String,
}

/// The settings document written for the ETL engine.
///
/// Immutable once built; a fresh one is synthesized per invocation.
#[derive(Debug, Clone, Serialize)]
pub struct EtlSettings {
    database_url: String,
    node_addr: String,
    backfill: String,
    mode: Mode,
    log: LogSettings,
}

impl EtlSettings {
    /// Synthesize the settings document from resolved service info and
    /// CLI flags.
    #[must_use]
    pub fn new(info: &ServiceInfo, mode: Mode, backfill: bool) -> Self {
        Self {
            database_url: info.db().url(),
            node_addr: info.node().url(),
            backfill: backfill.to_string(),
            mode,
            log: LogSettings {
                log_dir: ETL_LOG_DIR.to_string(),
            },
        }
    }

    /// Mode the engine will run in.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Render the document as TOML.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if serialization fails.
    pub fn to_toml(&self) -> EntrypointResult<String> {
        toml::to_string(self).map_err(|e| {
            EntrypointError::config("Failed to serialize settings to TOML", Some(Box::new(e)))
        })
    }

    /// Write the document to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if serialization or the file write
    /// fails.
    pub fn write_to_file(&self, path: &Path) -> EntrypointResult<()> {
        let rendered = self.to_toml()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EntrypointError::config(
                    format!("Failed to create settings directory {}", parent.display()),
                    Some(Box::new(e)),
                )
            })?;
        }

        fs::write(path, rendered).map_err(|e| {
            EntrypointError::config(
                format!("Failed to write settings file {}", path.display()),
                Some(Box::new(e)),
            )
        })?;

        info!(path = %path.display(), "Wrote engine settings file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DbInfo, NodeInfo, ServiceInfo};

    fn sample_service_info() -> ServiceInfo {
        let db: DbInfo = serde_json::from_str(
            r#"{"host":"db","port":5432,"username":"u","password":"p","dbname":"etl"}"#,
        )
        .expect("valid sample payload");
        ServiceInfo::new(db, NodeInfo::resolve(""))
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("full".parse::<Mode>().expect("valid"), Mode::Full);
        assert_eq!("filters".parse::<Mode>().expect("valid"), Mode::Filters);
        assert_eq!("rewards".parse::<Mode>().expect("valid"), Mode::Rewards);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = "sideways".parse::<Mode>().expect_err("must be rejected");
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn test_backfill_serialized_as_string() {
        let settings = EtlSettings::new(&sample_service_info(), Mode::Full, true);
        let rendered = settings.to_toml().expect("serializes");

        assert!(rendered.contains(r#"backfill = "true""#));
        assert!(rendered.contains(r#"mode = "full""#));
        assert!(rendered.contains("[log]"));
        assert!(rendered.contains(r#"log_dir = "/opt/etl-lite""#));
    }

    #[test]
    fn test_database_url_copied_verbatim() {
        let settings = EtlSettings::new(&sample_service_info(), Mode::Rewards, false);
        let rendered = settings.to_toml().expect("serializes");

        assert!(rendered.contains(r#"database_url = "postgresql://u:p@db:5432/etl""#));
        assert!(rendered.contains(r#"backfill = "false""#));
    }

    #[test]
    fn test_write_to_file_creates_parent_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config").join("settings.toml");

        let settings = EtlSettings::new(&sample_service_info(), Mode::Filters, true);
        settings.write_to_file(&path).expect("write succeeds");

        let written = std::fs::read_to_string(&path).expect("file exists");
        assert!(written.contains(r#"mode = "filters""#));
    }
}
