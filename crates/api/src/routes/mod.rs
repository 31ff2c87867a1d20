//! HTTP route handlers.

pub mod alerts;
pub mod auth;
pub mod communities;
pub mod health;
pub mod invites;
pub mod subscription;
pub mod users;
