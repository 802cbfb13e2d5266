//! Seeding of account/gateway address filters into the database.
//!
//! In `filters` mode the engine only follows addresses present in the
//! `filters` table, so those rows must exist before the engine starts. The
//! address allow-lists arrive as comma-separated environment variables and
//! each list is written as a single bulk `INSERT` on its own connection.
//!
//! Seeding is intentionally not idempotent: no existence check is made, and
//! re-running the entrypoint with the same environment inserts duplicate
//! rows. Deduplication is the engine's concern, not the entrypoint's.

use crate::config::DbInfo;
use crate::error::{EntrypointError, EntrypointResult};
use crate::settings::Mode;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the comma-separated account allow-list.
pub const ACCOUNT_ADDRESSES_ENV_VAR: &str = "ACCOUNT_ADDRESSES";

/// Environment variable holding the comma-separated gateway allow-list.
pub const GATEWAY_ADDRESSES_ENV_VAR: &str = "GATEWAY_ADDRESSES";

/// Row tag for the `filters(type, value)` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Account address filter.
    Account,
    /// Gateway address filter.
    Gateway,
}

impl FilterKind {
    /// Value stored in the `type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Gateway => "gateway",
        }
    }
}

/// What the seeder did for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// At least one address list was written to the database.
    Seeded,
    /// No address data was supplied; nothing touched the database.
    Skipped,
}

/// Split the non-empty allow-lists into `(kind, values)` pairs.
///
/// An absent or empty variable contributes nothing. Values are taken
/// verbatim between commas, matching what operators put in the variable.
fn address_lists(
    accounts: Option<&str>,
    gateways: Option<&str>,
) -> Vec<(FilterKind, Vec<String>)> {
    let mut lists = Vec::new();
    if let Some(raw) = accounts.filter(|s| !s.is_empty()) {
        lists.push((
            FilterKind::Account,
            raw.split(',').map(str::to_string).collect(),
        ));
    }
    if let Some(raw) = gateways.filter(|s| !s.is_empty()) {
        lists.push((
            FilterKind::Gateway,
            raw.split(',').map(str::to_string).collect(),
        ));
    }
    lists
}

/// Insert one address list as a single bulk statement.
///
/// Opens its own short-lived connection so that a failure here never rolls
/// back a list committed before it.
async fn insert_filter_rows(
    db: &DbInfo,
    kind: FilterKind,
    values: &[String],
) -> EntrypointResult<()> {
    info!(
        kind = kind.as_str(),
        count = values.len(),
        "Writing addresses to filters table"
    );

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&db.url())
        .await
        .map_err(|e| {
            EntrypointError::database(
                format!("Failed to connect to database at {}:{}", db.host(), db.port()),
                Some(Box::new(e)),
            )
        })?;

    sqlx::query("INSERT INTO public.filters (type, value) SELECT $1, unnest($2::text[])")
        .bind(kind.as_str())
        .bind(values)
        .execute(&pool)
        .await
        .map_err(|e| {
            EntrypointError::database(
                format!("Failed to insert {} filters", kind.as_str()),
                Some(Box::new(e)),
            )
        })?;

    Ok(())
}

/// Seed the filters table from the allow-list environment variables.
///
/// Behavior by input:
/// - `filters` mode with neither list set: logs a warning and returns
///   [`SeedOutcome::Skipped`] with zero database activity. The engine would
///   follow nothing, which is almost certainly an operator mistake, but it
///   is not fatal.
/// - Any present non-empty list is written as one bulk insert per list,
///   each on its own connection. A database error is fatal and propagates.
/// - Returns [`SeedOutcome::Seeded`] when at least one list was written.
///
/// # Errors
///
/// Returns a database error if connecting or inserting fails. Nothing is
/// retried here.
pub async fn seed_filters(db: &DbInfo, mode: Mode) -> EntrypointResult<SeedOutcome> {
    let accounts = env::var(ACCOUNT_ADDRESSES_ENV_VAR).ok();
    let gateways = env::var(GATEWAY_ADDRESSES_ENV_VAR).ok();
    seed_filters_from(db, mode, accounts.as_deref(), gateways.as_deref()).await
}

/// Seeding with the allow-lists passed explicitly.
///
/// # Errors
///
/// Same contract as [`seed_filters`].
pub async fn seed_filters_from(
    db: &DbInfo,
    mode: Mode,
    accounts: Option<&str>,
    gateways: Option<&str>,
) -> EntrypointResult<SeedOutcome> {
    let lists = address_lists(accounts, gateways);

    if lists.is_empty() {
        if mode == Mode::Filters {
            warn!(
                "Running in filters mode but neither {ACCOUNT_ADDRESSES_ENV_VAR} nor \
                 {GATEWAY_ADDRESSES_ENV_VAR} env vars are set"
            );
        }
        return Ok(SeedOutcome::Skipped);
    }

    for (kind, values) in &lists {
        insert_filter_rows(db, *kind, values).await?;
    }

    info!("Successfully wrote filters");
    Ok(SeedOutcome::Seeded)
}
