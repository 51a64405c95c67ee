//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Transient, QueryLogEntry)
//! - Domain value objects (name normalization, Pagination)
//! - Domain services (upstream reply normalization)
//! - Repository and registry traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
