//! Acting-user extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::errors::AuthError;
use domain::models::User;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::SessionAuth;

/// The authenticated user, freshly read from the store.
///
/// The record is loaded on every request, so role and membership changes
/// take effect immediately and a deleted account loses access even while
/// its token is still valid.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: SessionAuth,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match parts.extensions.get::<SessionAuth>() {
            Some(session) => session.clone(),
            None => SessionAuth::from_headers(&state.jwt, &parts.headers)?,
        };

        let user = state
            .identity()
            .get_user(session.user_id)
            .await
            .map_err(|e| match e {
                AuthError::UserNotFound => {
                    tracing::warn!(user_id = session.user_id, jti = %session.jti, "Session for missing user");
                    ApiError::Unauthorized("Invalid session token".to_string())
                }
                other => ApiError::from(other),
            })?;

        Ok(CurrentUser { user, session })
    }
}
