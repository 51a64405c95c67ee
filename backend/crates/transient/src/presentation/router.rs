//! Transient Router

use crate::application::config::ApiConfig;
use crate::domain::repository::{QueryLogRepository, TransientRegistry, TransientRepository};
use crate::infra::postgres::PgTransientRepository;
use crate::infra::tns::TnsClient;
use crate::presentation::handlers::{self, TransientAppState};
use crate::presentation::middleware::require_api_key;
use crate::presentation::search;
use axum::{
    Router,
    middleware,
    routing::{get, patch},
};
use std::sync::Arc;

/// Create the transient router with PostgreSQL repository and TNS client
///
/// Serves `/api/...` and `/search`; meant to be merged at the root.
pub fn transient_router(
    repo: PgTransientRepository,
    registry: TnsClient,
    api: ApiConfig,
) -> Router {
    transient_router_generic(repo, registry, api)
}

/// Create a generic transient router for any repository and registry
pub fn transient_router_generic<R, G>(repo: R, registry: G, api: ApiConfig) -> Router
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let state = TransientAppState {
        repo: Arc::new(repo),
        registry: Arc::new(registry),
    };

    let protected = Router::new()
        .route(
            "/transient/{name}",
            get(handlers::get_transient::<R, G>).delete(handlers::delete_transient::<R, G>),
        )
        .route(
            "/transient/{name}/redshift",
            patch(handlers::update_redshift::<R, G>),
        )
        .route("/transient/{name}/ebv", patch(handlers::update_ebv::<R, G>))
        .route("/transients", get(handlers::get_transients::<R, G>))
        .route("/transients/all", get(handlers::list_transients::<R, G>))
        .route("/monitoring/logs", get(handlers::list_query_logs::<R, G>))
        .layer(middleware::from_fn_with_state(
            Arc::new(api),
            require_api_key,
        ));

    let open = Router::new()
        .route("/health", get(handlers::health))
        .route("/monitoring/tns", get(handlers::rate_limit_status::<R, G>));

    Router::new()
        .nest("/api", protected.merge(open))
        .route("/search", get(search::search::<R, G>))
        .with_state(state)
}
