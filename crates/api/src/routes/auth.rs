//! Authentication routes for registration and login.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::errors::PolicyError;
use domain::models::{LimitedAction, User};
use domain::services::{IdentityService, Registration};
use serde::{Deserialize, Serialize};
use shared::jwt::{IssuedToken, SessionKind};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::metrics::{record_limit_refusal, record_user_registered};
use crate::routes::users::UserResponse;

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    pub display_name: Option<String>,

    /// Slug of the invite link the user arrived through, if any.
    #[validate(length(min = 1, max = 100, message = "Invalid invite link"))]
    pub invite_slug: Option<String>,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    /// Selects the longer "remember me" session lifetime.
    #[serde(default)]
    pub remember: bool,
}

/// Session token in responses.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub session: SessionKind,
}

impl TokenResponse {
    fn new(issued: IssuedToken, session: SessionKind) -> Self {
        Self {
            access_token: issued.token,
            token_type: "Bearer",
            expires_at: issued.expires_at,
            session,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
    /// Lets the client show its welcome flow once.
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: TokenResponse,
}

fn issue_token(state: &AppState, user: &User, remember: bool) -> Result<TokenResponse, ApiError> {
    let issued = state
        .jwt
        .issue_session(user.id, remember)
        .map_err(|e| ApiError::Internal(format!("Failed to issue session token: {}", e)))?;
    let kind = if remember {
        SessionKind::Remembered
    } else {
        SessionKind::Standard
    };
    Ok(TokenResponse::new(issued, kind))
}

/// Register a new user, optionally joining a community through an invite.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;
    IdentityService::check_credentials(&request.email, &request.password)?;

    // An invite must resolve, and the community must have room, before any
    // account is created.
    let community = match request.invite_slug.as_deref() {
        Some(slug) => {
            let community = state.communities().get_by_invite_slug(slug).await?;
            state
                .policy()
                .check_community_limit(&community, LimitedAction::AddMember)
                .await
                .map_err(|e| {
                    if matches!(e, PolicyError::LimitReached(_)) {
                        record_limit_refusal("add_member");
                    }
                    ApiError::from(e)
                })?;
            Some(community)
        }
        None => None,
    };

    let user = state
        .identity()
        .register(Registration {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
            community_id: community.as_ref().map(|c| c.id),
            ..Default::default()
        })
        .await?;

    record_user_registered(community.is_some());
    if let Some(community) = &community {
        info!(user_id = user.id, community_id = community.id, "User registered through invite");
    }

    let token = issue_token(&state, &user, false)?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(&user),
            token,
            is_new_user: true,
        }),
    ))
}

/// Exchange credentials for a session token.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .identity()
        .authenticate(&request.email, &request.password)
        .await?;

    let token = issue_token(&state, &user, request.remember)?;
    Ok(Json(LoginResponse {
        user: UserResponse::from(&user),
        token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"password123"}"#).unwrap();
        assert!(request.display_name.is_none());
        assert!(request.invite_slug.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_empty_invite_slug() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"password123","invite_slug":""}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_remember_defaults_false() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"x"}"#).unwrap();
        assert!(!request.remember);

        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"x","remember":true}"#)
                .unwrap();
        assert!(request.remember);
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        // Domain validation reports "Email and password are required".
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }
}
