//! Bounded-retry TCP readiness probing.
//!
//! Before the engine starts, both the database and the blockchain node
//! must be accepting connections. The prober attempts a plain TCP connect
//! with a short timeout; a failed attempt sleeps and retries until the
//! attempt budget is exhausted, at which point the whole invocation fails.
//!
//! Attempts are strictly sequential. The dependencies themselves are probed
//! in a fixed order by the orchestrator: database first, then node.

use crate::error::{EntrypointError, EntrypointResult};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

/// Default number of connection attempts.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default sleep between attempts.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(1);

/// Default per-attempt connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Single TCP connect attempt against `host:port`.
///
/// Returns true when the remote accepted the connection within
/// `connect_timeout`. The accepted stream is dropped immediately; only
/// reachability matters here.
async fn is_remote_port_open(host: &str, port: u16, connect_timeout: Duration) -> bool {
    matches!(
        timeout(connect_timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Probe `host:port` until it accepts a connection or the budget runs out.
///
/// Performs at most `retries` sequential attempts, each bounded by
/// `connect_timeout`, sleeping `sleep` after every failed attempt.
///
/// # Errors
///
/// Returns [`EntrypointError::UnreachableError`] naming the host, port, and
/// attempt count once all attempts have failed. The caller treats this as
/// fatal; no recovery happens above this function.
pub async fn probe_with_retry(
    host: &str,
    port: u16,
    retries: u32,
    sleep: Duration,
    connect_timeout: Duration,
) -> EntrypointResult<()> {
    for attempt in 1..=retries {
        if is_remote_port_open(host, port, connect_timeout).await {
            info!(host, port, attempt, "Dependency is reachable");
            return Ok(());
        }
        debug!(
            host,
            port,
            attempt,
            sleep_secs = sleep.as_secs_f64(),
            "Connection attempt failed, sleeping before retry"
        );
        tokio::time::sleep(sleep).await;
    }
    Err(EntrypointError::unreachable(host, port, retries))
}

/// Probe with the default retry budget.
///
/// # Errors
///
/// Same contract as [`probe_with_retry`].
pub async fn probe(host: &str, port: u16) -> EntrypointResult<()> {
    probe_with_retry(host, port, DEFAULT_RETRIES, DEFAULT_SLEEP, DEFAULT_CONNECT_TIMEOUT).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_succeeds_on_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let result = probe_with_retry(
            "127.0.0.1",
            addr.port(),
            1,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_exhausts_budget_on_closed_port() {
        // Bind then drop so the port is known-closed when we probe it
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let result = probe_with_retry(
            "127.0.0.1",
            addr.port(),
            3,
            Duration::from_millis(5),
            Duration::from_millis(200),
        )
        .await;

        match result {
            Err(EntrypointError::UnreachableError {
                host,
                port,
                attempts,
            }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, addr.port());
                assert_eq!(attempts, 3);
            }
            other => panic!("expected UnreachableError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_probe_stops_on_first_success() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let start = std::time::Instant::now();
        let result = probe_with_retry(
            "127.0.0.1",
            addr.port(),
            5,
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .await;

        assert!(result.is_ok());
        // A first-attempt success never enters the retry sleep
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
