//! Error Kind
//!
//! HTTP-facing classification of failures.

use serde::Serialize;

/// What went wrong, as far as an HTTP caller is concerned.
///
/// ```rust
/// use kernel::ErrorKind;
///
/// assert_eq!(ErrorKind::RequestTimeout.status_code(), 408);
/// assert_eq!(ErrorKind::RequestTimeout.as_str(), "Request Timeout");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed request parameters
    BadRequest,
    /// Missing or wrong API key
    Forbidden,
    /// Transient unknown locally and upstream, or a malformed name
    NotFound,
    /// The upstream registry kept rate limiting us
    RequestTimeout,
    InternalServerError,
    /// The upstream registry answered with an error
    BadGateway,
}

impl ErrorKind {
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::RequestTimeout => 408,
            ErrorKind::InternalServerError => 500,
            ErrorKind::BadGateway => 502,
        }
    }

    /// Reason phrase for the status line
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::RequestTimeout => "Request Timeout",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::BadGateway => "Bad Gateway",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
