//! Shared Kernel
//!
//! The error vocabulary crates agree on at the HTTP boundary: an
//! [`AppError`] carrying an [`ErrorKind`], rendered as RFC 7807 problem
//! details when the `axum` feature is on.

pub mod error {
    pub mod app_error;
    pub mod kind;
    #[cfg(feature = "axum")]
    pub mod response;
}

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
