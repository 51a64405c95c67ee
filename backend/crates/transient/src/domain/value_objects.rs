//! Domain Value Objects
//!
//! Immutable value types for the transient domain.

use crate::error::{TransientError, TransientResult};

/// Prefixes dropped from IAU names, compared case-insensitively
const NAME_PREFIXES: [&str; 2] = ["sn", "at"];

/// Normalize a user-supplied transient name.
///
/// Strips surrounding whitespace and a leading `SN`/`AT` (any case), then
/// requires the first two remaining characters to be digits, the start of a
/// discovery year. `"SN2022G"`, `"at2022G"` and `"2022G"` all become
/// `"2022G"`.
pub fn verify_transient_name(name: &str) -> TransientResult<String> {
    let trimmed = name.trim();

    let unprefixed = NAME_PREFIXES
        .iter()
        .find(|prefix| {
            trimmed
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .map_or(trimmed, |prefix| &trimmed[prefix.len()..]);

    let year_start = unprefixed.as_bytes().get(..2);
    match year_start {
        Some(digits) if digits.iter().all(u8::is_ascii_digit) => Ok(unprefixed.to_string()),
        _ => Err(TransientError::MalformedName(name.to_string())),
    }
}

/// Split a free-form list of names (`"SN2022G, 2020abc"`).
///
/// All whitespace is removed before splitting on commas; empty entries are
/// dropped. Names are not normalized here.
pub fn parse_name_list(input: &str) -> Vec<String> {
    let compact: String = input.split_whitespace().collect();
    compact
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Limit/offset window over stored rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn new(limit: Option<i64>, offset: Option<i64>) -> TransientResult<Self> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        let offset = offset.unwrap_or(0);

        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(TransientError::InvalidParameter(format!(
                "limit must be between 1 and {}, got {limit}",
                Self::MAX_LIMIT
            )));
        }
        if offset < 0 {
            return Err(TransientError::InvalidParameter(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        Ok(Self { limit, offset })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Optional filters for listing stored query logs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryLogFilter {
    pub id: Option<i64>,
    pub code: Option<u16>,
    pub name: Option<String>,
    pub page: Pagination,
}
