//! Domain Entities
//!
//! Core business entities for the transient domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transient - an AT/SN record cached from the upstream registry
///
/// Identity is the IAU `name`; everything else is plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transient {
    /// IAU name without the SN/AT prefix (e.g. `2022G`)
    pub name: String,
    pub redshift: f64,
    /// Right ascension (J2000) in degrees
    pub ra: f64,
    /// Declination (J2000) in degrees
    pub dec: f64,
    /// E(B-V) dust extinction, not provided by the registry
    pub ebv: f64,
}

impl Transient {
    pub fn new(name: impl Into<String>, redshift: f64, ra: f64, dec: f64, ebv: f64) -> Self {
        Self {
            name: name.into(),
            redshift,
            ra,
            dec,
            ebv,
        }
    }
}

/// QueryLogEntry - one upstream request attempt
///
/// Produced for every attempt, including the ones retried after a rate
/// limit, and handed to the query log repository by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryLogEntry {
    /// Name that was queried
    pub name: String,
    /// Request description (method, URL, payload without credentials)
    pub query: String,
    /// Upstream `id_message`, or the raw body when it had none
    pub response: String,
    /// Upstream HTTP status
    pub code: u16,
}

/// A persisted [`QueryLogEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredQueryLog {
    pub id: i64,
    #[serde(flatten)]
    pub entry: QueryLogEntry,
    pub created_at: DateTime<Utc>,
}
