//! JSON body extractor whose rejections use the API error shape.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Drop-in for `axum::Json` on request bodies.
///
/// Malformed or mistyped bodies become a 400 `validation_error` instead of
/// axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
