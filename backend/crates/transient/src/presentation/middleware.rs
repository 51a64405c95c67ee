//! API Key Middleware

use crate::application::config::ApiConfig;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::AppError;
use platform::client::{extract_api_key, verify_api_key};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    api_key: Option<String>,
}

/// Middleware that requires the service `api_key` (header or query string)
pub async fn require_api_key(
    State(config): State<Arc<ApiConfig>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let query_key = Query::<ApiKeyQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.api_key);
    let header_key = extract_api_key(req.headers());

    if let Err(e) = verify_api_key(header_key, query_key.as_deref(), &config.api_key) {
        tracing::warn!(
            path = %req.uri().path(),
            has_header = header_key.is_some(),
            has_query = query_key.is_some(),
            "Rejected request without a valid API key"
        );
        return Err(AppError::forbidden(e.to_string()).into_response());
    }

    Ok(next.run(req).await)
}
