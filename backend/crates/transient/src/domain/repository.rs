//! Repository Traits
//!
//! Interfaces for persistence and for the upstream registry. Implementations
//! live in the infrastructure layer.

use platform::rate_limit::RateLimitSnapshot;

use crate::domain::entities::{QueryLogEntry, StoredQueryLog, Transient};
use crate::domain::value_objects::{Pagination, QueryLogFilter};
use crate::error::TransientResult;

/// Transient repository trait
#[trait_variant::make(TransientRepository: Send)]
pub trait LocalTransientRepository {
    /// Get a stored transient by its normalized name
    async fn lookup_by_name(&self, name: &str) -> TransientResult<Option<Transient>>;

    /// Get the stored subset of `names`, ordered by name, windowed by `page`
    async fn lookup_many(
        &self,
        names: &[String],
        page: Pagination,
    ) -> TransientResult<Vec<Transient>>;

    /// List all stored transients
    async fn list(&self, page: Pagination) -> TransientResult<Vec<Transient>>;

    /// Insert or update on name; returns the stored row
    async fn save(&self, transient: &Transient) -> TransientResult<Transient>;

    /// Insert or update several transients in one transaction
    async fn save_many(&self, transients: &[Transient]) -> TransientResult<Vec<Transient>>;

    async fn update_redshift(&self, name: &str, redshift: f64)
    -> TransientResult<Option<Transient>>;

    async fn update_ebv(&self, name: &str, ebv: f64) -> TransientResult<Option<Transient>>;

    /// Returns false when nothing was stored under `name`
    async fn delete(&self, name: &str) -> TransientResult<bool>;
}

/// Query log repository trait
#[trait_variant::make(QueryLogRepository: Send)]
pub trait LocalQueryLogRepository {
    /// Append one entry per upstream attempt
    async fn append_logs(&self, entries: &[QueryLogEntry]) -> TransientResult<()>;

    /// Newest first
    async fn list_logs(&self, filter: &QueryLogFilter) -> TransientResult<Vec<StoredQueryLog>>;
}

/// Result of one registry fetch together with the attempts it took.
///
/// Logs are returned even when the fetch failed, so the caller can persist
/// every attempt.
#[derive(Debug)]
pub struct RegistryFetch<T> {
    pub result: TransientResult<T>,
    pub logs: Vec<QueryLogEntry>,
}

/// Upstream transient registry
#[trait_variant::make(TransientRegistry: Send)]
pub trait LocalTransientRegistry {
    /// Fetch one transient by normalized name
    async fn fetch_transient(&self, name: &str) -> RegistryFetch<Transient>;

    /// Fetch several transients concurrently; fails as a whole on any error
    async fn fetch_transients(&self, names: &[String]) -> RegistryFetch<Vec<Transient>>;

    /// Current upstream rate limit state
    fn rate_limit_snapshot(&self) -> RateLimitSnapshot;
}
