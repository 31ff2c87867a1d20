//! Community management routes.
//!
//! Every route except creation acts on the caller's own community, read
//! fresh from the store by the `CurrentUser` extractor.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use domain::errors::CommunityError;
use domain::models::{Branding, Community, CommunityUsage, Role, SubscriptionTier, User};
use domain::services::check_premium_access;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, CurrentUser};

/// Community details as shown to a member.
#[derive(Debug, Clone, Serialize)]
pub struct CommunityResponse {
    pub id: i64,
    pub name: String,
    pub invite_slug: String,
    pub subscription_plan: SubscriptionTier,
    pub business_id: Option<i64>,
    pub member_count: i64,
    pub branding: Branding,
    /// Whether the caller may manage this community.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl CommunityResponse {
    pub async fn build(
        state: &AppState,
        community: Community,
        viewer: &User,
    ) -> Result<Self, ApiError> {
        let member_count = state.communities().member_count(community.id).await?;
        let branding = state.businesses().community_branding(community.id).await?;

        Ok(Self {
            is_admin: viewer.is_admin() && viewer.community_id == Some(community.id),
            id: community.id,
            name: community.name,
            invite_slug: community.invite_slug,
            subscription_plan: community.subscription_plan,
            business_id: community.business_id,
            member_count,
            branding,
            created_at: community.created_at,
        })
    }
}

/// A community member as listed to other members.
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: i64,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
}

impl From<User> for MemberResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommunityRequest {
    #[serde(default)]
    pub name: String,
    /// GeoJSON text; empty when omitted.
    pub boundary: Option<String>,
    pub business_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameCommunityRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundaryRequest {
    #[serde(default)]
    pub boundary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryResponse {
    pub community_id: i64,
    pub boundary: Option<String>,
}

fn own_community_id(user: &User) -> Result<i64, ApiError> {
    user.community_id
        .ok_or_else(|| CommunityError::NotMember.into())
}

/// POST /api/v1/communities
pub async fn create_community(
    State(state): State<AppState>,
    CurrentUser { mut user, .. }: CurrentUser,
    ApiJson(request): ApiJson<CreateCommunityRequest>,
) -> Result<(StatusCode, Json<CommunityResponse>), ApiError> {
    let community = state
        .communities()
        .create_community(
            &mut user,
            &request.name,
            request.boundary.as_deref().unwrap_or_default(),
            request.business_id,
        )
        .await?;

    let response = CommunityResponse::build(&state, community, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/community
pub async fn get_community(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> Result<Json<CommunityResponse>, ApiError> {
    let community_id = own_community_id(&user)?;
    let community = state.communities().get_info(community_id).await?;
    Ok(Json(CommunityResponse::build(&state, community, &user).await?))
}

/// POST /api/v1/community/leave
pub async fn leave_community(
    State(state): State<AppState>,
    CurrentUser { mut user, .. }: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.communities().leave_community(&mut user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/community/members
pub async fn list_members(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let community_id = own_community_id(&user)?;
    let members = state.communities().get_members(community_id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// DELETE /api/v1/community/members/:member_id
pub async fn remove_member(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    Path(member_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.communities().remove_member(member_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/community/name
pub async fn rename_community(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    ApiJson(request): ApiJson<RenameCommunityRequest>,
) -> Result<Json<CommunityResponse>, ApiError> {
    let community_id = own_community_id(&user)?;
    let community = state
        .communities()
        .rename_community(&request.name, community_id, &user)
        .await?;
    Ok(Json(CommunityResponse::build(&state, community, &user).await?))
}

/// GET /api/v1/community/boundary
pub async fn get_boundary(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> Result<Json<BoundaryResponse>, ApiError> {
    let community_id = own_community_id(&user)?;
    let boundary = state.communities().get_boundary_data(community_id).await?;
    Ok(Json(BoundaryResponse {
        community_id,
        boundary,
    }))
}

/// PUT /api/v1/community/boundary
pub async fn update_boundary(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
    ApiJson(request): ApiJson<BoundaryRequest>,
) -> Result<Json<BoundaryResponse>, ApiError> {
    let community_id = own_community_id(&user)?;
    let community = state
        .communities()
        .update_boundary(&request.boundary, community_id, &user)
        .await?;
    Ok(Json(BoundaryResponse {
        community_id,
        boundary: Some(community.boundary_data).filter(|b| !b.is_empty()),
    }))
}

/// Usage against plan caps. Premium only.
///
/// GET /api/v1/community/usage
pub async fn get_usage(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> Result<Json<CommunityUsage>, ApiError> {
    check_premium_access(Some(&user), Some("community analytics"))?;

    let community_id = own_community_id(&user)?;
    let community = state.communities().get_info(community_id).await?;
    let usage = state.policy().community_usage(&community).await?;
    Ok(Json(usage))
}
