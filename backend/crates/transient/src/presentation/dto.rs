//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use platform::rate_limit::RateLimitSnapshot;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{StoredQueryLog, Transient};

/// Response body for a transient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientResponse {
    pub name: String,
    pub redshift: f64,
    pub ra: f64,
    pub dec: f64,
    pub ebv: f64,
}

impl From<Transient> for TransientResponse {
    fn from(t: Transient) -> Self {
        Self {
            name: t.name,
            redshift: t.redshift,
            ra: t.ra,
            dec: t.dec,
            ebv: t.ebv,
        }
    }
}

/// Query for GET /api/transient/{name}
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetTransientQuery {
    #[serde(default)]
    pub force_tns: bool,
}

/// Query for GET /api/transients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransientsQuery {
    /// Comma-separated names
    #[serde(default)]
    pub names: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query for GET /api/transients/all
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query for PATCH /api/transient/{name}/redshift
#[derive(Debug, Clone, Deserialize)]
pub struct RedshiftQuery {
    pub redshift: f64,
}

/// Query for PATCH /api/transient/{name}/ebv
#[derive(Debug, Clone, Deserialize)]
pub struct EbvQuery {
    pub ebv: f64,
}

/// Query for GET /api/monitoring/logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryLogQuery {
    pub id: Option<i64>,
    pub code: Option<u16>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query for GET /search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtype: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for GET /api/monitoring/tns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitResponse {
    /// Seconds until the upstream limit resets
    pub current: u64,
    /// Seconds spent waiting so far
    pub total: u64,
    pub max: u64,
    pub triggered: u64,
}

impl From<RateLimitSnapshot> for RateLimitResponse {
    fn from(s: RateLimitSnapshot) -> Self {
        Self {
            current: s.current,
            total: s.total,
            max: s.max,
            triggered: s.triggered,
        }
    }
}

/// Response item for GET /api/monitoring/logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogResponse {
    pub id: i64,
    pub name: String,
    pub query: String,
    pub response: String,
    pub code: u16,
    pub created_at: DateTime<Utc>,
}

impl From<StoredQueryLog> for QueryLogResponse {
    fn from(log: StoredQueryLog) -> Self {
        Self {
            id: log.id,
            name: log.entry.name,
            query: log.entry.query,
            response: log.entry.response,
            code: log.entry.code,
            created_at: log.created_at,
        }
    }
}
