//! Client API key utilities
//!
//! Incoming requests identify themselves with an `api_key`, sent either as a
//! request header or as a query parameter.

use axum::http::HeaderMap;

use crate::crypto::constant_time_eq;

/// Header and query parameter name carrying the API key
pub const API_KEY_NAME: &str = "api_key";

/// Error when authenticating a client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyError {
    #[error("Could not validate API KEY.")]
    Invalid,
}

/// Read the `api_key` request header, if present and valid UTF-8
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_NAME).and_then(|v| v.to_str().ok())
}

/// Accept the request when either the query or the header key matches.
///
/// The query parameter is checked first. Both comparisons are constant-time.
///
/// ## Arguments
/// * `header_key` - value of the `api_key` header
/// * `query_key` - value of the `api_key` query parameter
/// * `expected` - the configured service key
pub fn verify_api_key(
    header_key: Option<&str>,
    query_key: Option<&str>,
    expected: &str,
) -> Result<(), ApiKeyError> {
    let matches = |candidate: Option<&str>| {
        candidate.is_some_and(|key| constant_time_eq(key.as_bytes(), expected.as_bytes()))
    };

    if matches(query_key) || matches(header_key) {
        Ok(())
    } else {
        Err(ApiKeyError::Invalid)
    }
}
