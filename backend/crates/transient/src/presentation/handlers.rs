//! HTTP Handlers

use crate::application::get_transient::GetTransientUseCase;
use crate::application::get_transients::GetTransientsUseCase;
use crate::application::list_transients::ListTransientsUseCase;
use crate::application::query_logs::ListQueryLogsUseCase;
use crate::application::update_transient::UpdateTransientUseCase;
use crate::domain::repository::{QueryLogRepository, TransientRegistry, TransientRepository};
use crate::domain::value_objects::{Pagination, QueryLogFilter, parse_name_list};
use crate::error::TransientResult;
use crate::presentation::dto::{
    EbvQuery, GetTransientQuery, PageQuery, QueryLogQuery, QueryLogResponse, RateLimitResponse,
    RedshiftQuery, TransientResponse, TransientsQuery,
};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

/// Shared state for transient handlers
pub struct TransientAppState<R, G>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub registry: Arc<G>,
}

impl<R, G> Clone for TransientAppState<R, G>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// GET /api/health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/monitoring/tns
pub async fn rate_limit_status<R, G>(
    State(state): State<TransientAppState<R, G>>,
) -> Json<RateLimitResponse>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    Json(state.registry.rate_limit_snapshot().into())
}

/// GET /api/monitoring/logs
pub async fn list_query_logs<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Query(query): Query<QueryLogQuery>,
) -> TransientResult<Json<Vec<QueryLogResponse>>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let filter = QueryLogFilter {
        id: query.id,
        code: query.code,
        name: query.name.filter(|name| !name.trim().is_empty()),
        page: Pagination::new(query.limit, query.offset)?,
    };

    let use_case = ListQueryLogsUseCase::new(state.repo.clone());
    let logs = use_case.execute(&filter).await?;

    Ok(Json(logs.into_iter().map(QueryLogResponse::from).collect()))
}

/// GET /api/transient/{name}
pub async fn get_transient<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Path(name): Path<String>,
    Query(query): Query<GetTransientQuery>,
) -> TransientResult<Json<TransientResponse>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let use_case = GetTransientUseCase::new(state.repo.clone(), state.registry.clone());
    let transient = use_case.execute(&name, query.force_tns).await?;

    Ok(Json(transient.into()))
}

/// GET /api/transients?names=a,b
pub async fn get_transients<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Query(query): Query<TransientsQuery>,
) -> TransientResult<Json<Vec<TransientResponse>>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let names = parse_name_list(&query.names);
    let page = Pagination::new(query.limit, query.offset)?;

    let use_case = GetTransientsUseCase::new(state.repo.clone(), state.registry.clone());
    let transients = use_case.execute(&names, page).await?;

    Ok(Json(transients.into_iter().map(TransientResponse::from).collect()))
}

/// GET /api/transients/all
pub async fn list_transients<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Query(query): Query<PageQuery>,
) -> TransientResult<Json<Vec<TransientResponse>>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let page = Pagination::new(query.limit, query.offset)?;

    let use_case = ListTransientsUseCase::new(state.repo.clone());
    let transients = use_case.execute(page).await?;

    Ok(Json(transients.into_iter().map(TransientResponse::from).collect()))
}

/// PATCH /api/transient/{name}/redshift
pub async fn update_redshift<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Path(name): Path<String>,
    Query(query): Query<RedshiftQuery>,
) -> TransientResult<Json<TransientResponse>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let use_case = UpdateTransientUseCase::new(state.repo.clone());
    let transient = use_case.set_redshift(&name, query.redshift).await?;

    Ok(Json(transient.into()))
}

/// PATCH /api/transient/{name}/ebv
pub async fn update_ebv<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Path(name): Path<String>,
    Query(query): Query<EbvQuery>,
) -> TransientResult<Json<TransientResponse>>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let use_case = UpdateTransientUseCase::new(state.repo.clone());
    let transient = use_case.set_ebv(&name, query.ebv).await?;

    Ok(Json(transient.into()))
}

/// DELETE /api/transient/{name}
pub async fn delete_transient<R, G>(
    State(state): State<TransientAppState<R, G>>,
    Path(name): Path<String>,
) -> TransientResult<StatusCode>
where
    R: TransientRepository + QueryLogRepository + Send + Sync + 'static,
    G: TransientRegistry + Send + Sync + 'static,
{
    let use_case = UpdateTransientUseCase::new(state.repo.clone());
    use_case.delete(&name).await?;

    Ok(StatusCode::NO_CONTENT)
}
