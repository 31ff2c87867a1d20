//! Session authentication middleware.
//!
//! Validates the bearer token and records the session in the request
//! extensions. Loading the user record is left to the
//! [`CurrentUser`](crate::extractors::CurrentUser) extractor.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::{JwtConfig, JwtError, SessionKind};

use crate::app::AppState;
use crate::error::ApiError;

/// A validated session token.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    pub user_id: i64,
    /// JWT ID, for log correlation.
    pub jti: String,
    pub session: SessionKind,
}

impl SessionAuth {
    /// Validates a session token.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, JwtError> {
        let claims = jwt.validate_session(token)?;
        Ok(Self {
            user_id: claims.user_id()?,
            jti: claims.jti,
            session: claims.session,
        })
    }

    /// Reads and validates the `Authorization: Bearer` header.
    pub fn from_headers(jwt: &JwtConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = bearer_token(headers).ok_or_else(|| {
            ApiError::Unauthorized("Please log in to access this feature.".to_string())
        })?;

        Self::validate(jwt, token).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            match e {
                JwtError::TokenExpired => {
                    ApiError::Unauthorized("Your session has expired. Please log in again.".to_string())
                }
                _ => ApiError::Unauthorized("Invalid session token".to_string()),
            }
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid session token.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match SessionAuth::from_headers(&state.jwt, req.headers()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtConfig {
        JwtConfig::from_secret("unit-test-secret-that-is-long-enough!", 3600, 7200, 0).unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_from_headers_valid_session() {
        let jwt = jwt();
        let issued = jwt.issue_session(17, true).unwrap();
        let auth =
            SessionAuth::from_headers(&jwt, &headers_with(&format!("Bearer {}", issued.token)))
                .unwrap();

        assert_eq!(auth.user_id, 17);
        assert_eq!(auth.jti, issued.jti);
        assert_eq!(auth.session, SessionKind::Remembered);
    }

    #[test]
    fn test_from_headers_rejects_missing_and_garbage() {
        let jwt = jwt();
        assert!(matches!(
            SessionAuth::from_headers(&jwt, &HeaderMap::new()),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            SessionAuth::from_headers(&jwt, &headers_with("Bearer not-a-jwt")),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_from_headers_rejects_foreign_signature() {
        let other = JwtConfig::from_secret("another-secret-that-is-long-enough!!", 3600, 7200, 0)
            .unwrap();
        let token = other.issue_session(1, false).unwrap().token;
        assert!(SessionAuth::from_headers(&jwt(), &headers_with(&format!("Bearer {}", token)))
            .is_err());
    }
}
