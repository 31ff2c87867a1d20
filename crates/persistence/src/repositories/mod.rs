//! Repository implementations for database operations.

pub mod alert;
pub mod business;
pub mod community;
pub mod user;

use std::sync::Arc;

use domain::stores::Stores;
use sqlx::PgPool;

pub use alert::AlertRepository;
pub use business::BusinessRepository;
pub use community::CommunityRepository;
pub use user::UserRepository;

use crate::db::PgHealth;

/// PostgreSQL-backed implementations of every store, sharing one pool.
pub fn postgres_stores(pool: PgPool) -> Stores {
    Stores {
        users: Arc::new(UserRepository::new(pool.clone())),
        communities: Arc::new(CommunityRepository::new(pool.clone())),
        alerts: Arc::new(AlertRepository::new(pool.clone())),
        businesses: Arc::new(BusinessRepository::new(pool.clone())),
        health: Arc::new(PgHealth::new(pool)),
    }
}
