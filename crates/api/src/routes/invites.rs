//! Invite link routes: public preview and joining.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::errors::PolicyError;
use domain::models::{Branding, LimitedAction};
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_limit_refusal;
use crate::routes::communities::CommunityResponse;

/// What a visitor sees before accepting an invite.
#[derive(Debug, Clone, Serialize)]
pub struct InvitePreview {
    pub name: String,
    pub member_count: i64,
    pub branding: Branding,
}

/// GET /api/v1/invites/:slug
pub async fn preview_invite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<InvitePreview>, ApiError> {
    let registry = state.communities();
    let community = registry.get_by_invite_slug(&slug).await?;
    let member_count = registry.member_count(community.id).await?;
    let branding = state.businesses().community_branding(community.id).await?;

    Ok(Json(InvitePreview {
        name: community.name,
        member_count,
        branding,
    }))
}

/// Join the community behind an invite link.
///
/// POST /api/v1/invites/:slug/join
pub async fn join_by_invite(
    State(state): State<AppState>,
    CurrentUser { mut user, .. }: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<CommunityResponse>, ApiError> {
    let registry = state.communities();
    let community = registry.get_by_invite_slug(&slug).await?;

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

    registry.join(&community, &mut user).await?;

    let response = CommunityResponse::build(&state, community, &user).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_preview_serializes_branding() {
        let preview = InvitePreview {
            name: "Oak Street".to_string(),
            member_count: 4,
            branding: Branding::default(),
        };
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["name"], "Oak Street");
        assert_eq!(json["member_count"], 4);
        assert_eq!(json["branding"]["business_name"], "iZwi");
        assert_eq!(json["branding"]["is_white_labeled"], false);
    }
}
