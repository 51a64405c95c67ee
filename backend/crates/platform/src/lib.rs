//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Upstream rate-limit tracking driven by response headers
//! - API key extraction and verification for incoming requests
//! - Constant-time comparison

pub mod client;
pub mod crypto;
pub mod rate_limit;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
