//! Infrastructure Layer - Database and registry implementations

pub mod postgres;
pub mod tns;
