//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod config;
pub mod get_transient;
pub mod get_transients;
pub mod list_transients;
pub mod query_logs;
pub mod update_transient;

use crate::domain::repository::{QueryLogRepository, RegistryFetch};
use crate::error::TransientResult;

/// Persist the attempt logs of a registry fetch, then surface its result.
///
/// Failing to store the logs never masks the fetch outcome: a fetched
/// transient has already cost rate limit budget and still gets saved.
pub(crate) async fn record_fetch<L, T>(logs_repo: &L, fetch: RegistryFetch<T>) -> TransientResult<T>
where
    L: QueryLogRepository,
{
    let RegistryFetch { result, logs } = fetch;
    if logs.is_empty() {
        return result;
    }

    if let Err(e) = logs_repo.append_logs(&logs).await {
        tracing::warn!(error = %e, attempts = logs.len(), "Failed to store query logs");
    }
    result
}
