//! Persistence layer for the iZwi backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain store traits
//! - Query metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use repositories::postgres_stores;
