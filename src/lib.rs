//! # Helium ETL Lite container entrypoint
//!
//! Orchestrates everything the ETL engine needs before it can start inside
//! the container: parses the database credentials injected by AWS Copilot,
//! resolves the blockchain node address, writes the engine's
//! `settings.toml`, waits for both dependencies to accept TCP connections,
//! optionally seeds address filters into the database, and finally hands
//! control to the engine binary while mirroring its exit code.
//!
//! ## Architecture
//!
//! The crate is organized into small independent layers:
//!
//! 1. **Config Layer** ([`config`]) - secret payload and node address
//!    resolution
//! 2. **Settings Layer** ([`settings`]) - synthesis of the engine's TOML
//!    settings file
//! 3. **Probe Layer** ([`probe`]) - bounded-retry TCP readiness checks
//! 4. **Filters Layer** ([`filters`]) - allow-list seeding into Postgres
//! 5. **Process Layer** ([`process`]) - engine delegation with exit-code
//!    passthrough
//!
//! The [`cli`] module sequences the layers per subcommand; nothing below it
//! depends upward.
//!
//! ## Quick Start
//!
//! ```bash
//! # Full bootstrap with migrations, then start the engine
//! etl-lite-entrypoint run --migrate
//!
//! # Only render config/settings.toml
//! etl-lite-entrypoint write_config
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`error::EntrypointResult<T>`](error::EntrypointResult)
//! and the first fatal error aborts the remaining steps. The terminal error
//! decides the process exit code; a failed engine subprocess is mirrored
//! exactly.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod observability;
pub mod probe;
pub mod process;
pub mod settings;
