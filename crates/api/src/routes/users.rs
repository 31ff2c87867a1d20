//! Current-user profile routes.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use domain::models::{Role, SubscriptionTier, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, CurrentUser};

/// User as shown to its owner. The password hash never leaves the domain.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub community_id: Option<i64>,
    pub business_id: Option<i64>,
    pub role: Role,
    pub subscription_tier: SubscriptionTier,
    pub has_premium_access: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            community_id: user.community_id,
            business_id: user.business_id,
            role: user.role,
            subscription_tier: user.subscription_tier,
            has_premium_access: user.has_premium_access(),
            created_at: user.created_at,
        }
    }
}

/// GET /api/v1/me
pub async fn get_me(CurrentUser { user, .. }: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// Request body for updating the profile. Absent fields stay unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,

    #[validate(
        url(message = "Invalid avatar URL format"),
        length(max = 255, message = "Avatar URL must be 255 characters or fewer")
    )]
    pub avatar_url: Option<String>,
}

/// PUT /api/v1/me
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;

    let updated = state
        .identity()
        .update_profile(
            &user,
            request.display_name.as_deref(),
            request.avatar_url.as_deref(),
        )
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            email: "thandi@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: "Thandi".to_string(),
            avatar_url: None,
            community_id: Some(3),
            business_id: None,
            role: Role::Member,
            subscription_tier: SubscriptionTier::Free,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let json = serde_json::to_value(UserResponse::from(&user())).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "member");
        assert_eq!(json["subscription_tier"], "free");
        assert_eq!(json["has_premium_access"], false);
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }

    #[test]
    fn test_update_profile_request_avatar_validation() {
        let valid = UpdateProfileRequest {
            display_name: None,
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
        };
        assert!(valid.validate().is_ok());

        let invalid = UpdateProfileRequest {
            display_name: None,
            avatar_url: Some("not-a-url".to_string()),
        };
        assert!(invalid.validate().is_err());

        let empty = UpdateProfileRequest {
            display_name: None,
            avatar_url: None,
        };
        assert!(empty.validate().is_ok());
    }
}
