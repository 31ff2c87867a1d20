//! Domain layer for the iZwi backend.
//!
//! This crate contains:
//! - Domain models (User, Community, Business, Alert, subscription limits)
//! - Store traits the persistence layer implements
//! - Domain services (identity, community registry, alert ledger,
//!   access & limit policy, business registry, presentation helpers)
//! - The error taxonomy shared by all services

pub mod errors;
pub mod models;
pub mod services;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
