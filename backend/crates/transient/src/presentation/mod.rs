//! Presentation Layer
//!
//! HTTP handlers, DTOs and the HTML search page.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod search;
