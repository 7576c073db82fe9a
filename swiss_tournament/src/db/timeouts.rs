//! Time bounds for storage calls.
//!
//! The repository wraps every query in one of the `with_*timeout` helpers,
//! which also turn driver failures into [`TournamentError`]s. [`bounded`]
//! covers work that is already expressed in tournament errors, such as a
//! whole match report.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::tournament::{TournamentError, TournamentResult};

/// Bound on a single query (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on a whole match-report transaction (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound on bulk deletes and resets (30 seconds)
pub const LONG_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Await tournament work for at most `limit`.
///
/// The future is dropped when the limit passes, which rolls back any
/// transaction it owns.
pub async fn bounded<F, T>(limit: Duration, work: F) -> TournamentResult<T>
where
    F: Future<Output = TournamentResult<T>>,
{
    timeout(limit, work)
        .await
        .unwrap_or(Err(TournamentError::Timeout(limit)))
}

/// Await a query for at most `limit`, classifying driver errors.
///
/// See `From<sqlx::Error> for TournamentError` for how failures are sorted.
pub async fn with_timeout<F, T>(limit: Duration, query: F) -> TournamentResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    bounded(limit, async move { query.await.map_err(TournamentError::from) }).await
}

pub async fn with_default_timeout<F, T>(query: F) -> TournamentResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, query).await
}

pub async fn with_long_timeout<F, T>(query: F) -> TournamentResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(LONG_OPERATION_TIMEOUT, query).await
}
