//! Transient Metadata Backend Module
//!
//! Caches astronomical transient metadata from the Transient Name Server.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, name normalization, repository and registry traits
//! - `application/` - Configuration and use cases
//! - `infra/` - PostgreSQL repository, rate limit aware TNS client
//! - `presentation/` - HTTP handlers, API key middleware, search page
//!
//! ## Upstream Rate Limit
//! - One `RateLimitTracker` per process, shared by every `TnsClient`
//! - A lookup is attempted at most three times while the registry reports an
//!   exhausted limit, waiting for the announced reset between attempts
//! - Every attempt is recorded in the query log

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ApiConfig, TnsBot, TnsConfig};
pub use domain::entities::{QueryLogEntry, Transient};
pub use error::{TransientError, TransientResult};
pub use infra::postgres::PgTransientRepository;
pub use infra::tns::TnsClient;
pub use presentation::router::{transient_router, transient_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::{AppError, AppResult, ErrorKind};

#[cfg(test)]
mod tests;
