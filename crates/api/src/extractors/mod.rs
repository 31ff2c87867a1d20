//! Custom Axum extractors.

pub mod json;
pub mod user_auth;

pub use json::ApiJson;
pub use user_auth::CurrentUser;
