//! Community registry: creation, invites, membership and settings.

use std::sync::Arc;

use shared::sanitize::{sanitize_plain_text, validate_and_normalize_json, JsonNormalization};
use shared::slug::generate_invite_slug;
use tracing::{info, warn};

use crate::errors::CommunityError;
use crate::models::community::MAX_COMMUNITY_NAME_LENGTH;
use crate::models::{BoundaryPolicy, Community, NewCommunity, Role, SubscriptionTier, User};
use crate::services::policy::{can_moderate, within_reach};
use crate::stores::{CommunityStore, UserStore};

/// Registry tuning taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct CommunitySettings {
    pub boundary_policy: BoundaryPolicy,
    /// How many random slugs to try before giving up.
    pub invite_slug_attempts: u32,
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            boundary_policy: BoundaryPolicy::Strict,
            invite_slug_attempts: 5,
        }
    }
}

pub struct CommunityRegistry {
    users: Arc<dyn UserStore>,
    communities: Arc<dyn CommunityStore>,
    settings: CommunitySettings,
}

impl CommunityRegistry {
    pub fn new(
        users: Arc<dyn UserStore>,
        communities: Arc<dyn CommunityStore>,
        settings: CommunitySettings,
    ) -> Self {
        Self {
            users,
            communities,
            settings,
        }
    }

    /// Founds a community with `acting_user` as its admin.
    ///
    /// The community row and the admin promotion are written atomically, and
    /// `acting_user` is updated in place to match what was stored. A user who
    /// already belongs to a community may only found more on behalf of their
    /// business.
    pub async fn create_community(
        &self,
        acting_user: &mut User,
        name: &str,
        boundary: &str,
        business_id: Option<i64>,
    ) -> Result<Community, CommunityError> {
        if acting_user.community_id.is_some() && business_id.is_none() {
            return Err(CommunityError::AlreadyMember);
        }

        let name = validate_name(name)?;
        let boundary_data = self.normalize_boundary(boundary)?;

        if let Some(business_id) = business_id {
            if acting_user.business_id != Some(business_id) {
                return Err(CommunityError::PermissionDenied);
            }
        }

        if self.communities.name_exists(&name, None).await? {
            return Err(CommunityError::NameAlreadyExists);
        }

        let invite_slug = self.allocate_invite_slug().await?;
        let subscription_plan = if business_id.is_some() {
            SubscriptionTier::Premium
        } else {
            SubscriptionTier::Free
        };

        let community = self
            .communities
            .create_with_admin(NewCommunity {
                name,
                admin_user_id: acting_user.id,
                invite_slug,
                subscription_plan,
                boundary_data,
                business_id,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("name") {
                    CommunityError::NameAlreadyExists
                } else if e.is_unique_violation_on("invite_slug") {
                    CommunityError::InviteSlugUnavailable
                } else {
                    CommunityError::Store(e)
                }
            })?;

        acting_user.community_id = Some(community.id);
        acting_user.role = Role::Admin;

        info!(
            community_id = community.id,
            admin_user_id = acting_user.id,
            plan = %community.subscription_plan,
            business_id = ?community.business_id,
            "Community created"
        );
        Ok(community)
    }

    async fn allocate_invite_slug(&self) -> Result<String, CommunityError> {
        for attempt in 1..=self.settings.invite_slug_attempts.max(1) {
            let slug = generate_invite_slug();
            if !self.communities.slug_exists(&slug).await? {
                return Ok(slug);
            }
            warn!(attempt, "Invite slug collision, regenerating");
        }
        Err(CommunityError::InviteSlugUnavailable)
    }

    fn normalize_boundary(&self, boundary: &str) -> Result<String, CommunityError> {
        match validate_and_normalize_json(boundary.trim()) {
            JsonNormalization::SanitizedText(_)
                if self.settings.boundary_policy == BoundaryPolicy::Strict =>
            {
                Err(CommunityError::InvalidBoundaryFormat)
            }
            normalized => Ok(normalized.into_string()),
        }
    }

    pub async fn get_by_invite_slug(&self, slug: &str) -> Result<Community, CommunityError> {
        self.communities
            .find_by_invite_slug(slug.trim())
            .await?
            .ok_or(CommunityError::NotFound)
    }

    pub async fn get_info(&self, community_id: i64) -> Result<Community, CommunityError> {
        self.communities
            .find_by_id(community_id)
            .await?
            .ok_or(CommunityError::NotFound)
    }

    pub async fn get_members(&self, community_id: i64) -> Result<Vec<User>, CommunityError> {
        Ok(self.users.list_by_community(community_id).await?)
    }

    pub async fn member_count(&self, community_id: i64) -> Result<i64, CommunityError> {
        Ok(self.users.count_by_community(community_id).await?)
    }

    /// Stored boundary text, or `None` when none has been set.
    pub async fn get_boundary_data(
        &self,
        community_id: i64,
    ) -> Result<Option<String>, CommunityError> {
        let community = self.get_info(community_id).await?;
        Ok(Some(community.boundary_data).filter(|b| !b.is_empty()))
    }

    /// Loads a community the acting user may manage.
    async fn managed_community(
        &self,
        community_id: i64,
        acting_user: &User,
    ) -> Result<Community, CommunityError> {
        if !can_moderate(acting_user) {
            return Err(CommunityError::PermissionDenied);
        }
        let community = self.get_info(community_id).await?;
        if !within_reach(acting_user, &community) {
            return Err(CommunityError::PermissionDenied);
        }
        Ok(community)
    }

    /// Detaches a member from their community.
    pub async fn remove_member(
        &self,
        member_id: i64,
        acting_user: &User,
    ) -> Result<(), CommunityError> {
        if !can_moderate(acting_user) {
            return Err(CommunityError::PermissionDenied);
        }
        if member_id == acting_user.id {
            return Err(CommunityError::CannotRemoveSelf);
        }

        let member = self
            .users
            .find_by_id(member_id)
            .await?
            .ok_or(CommunityError::MemberNotFound)?;
        let community_id = member.community_id.ok_or(CommunityError::MemberNotFound)?;
        self.managed_community(community_id, acting_user).await?;

        if !self.users.clear_community(member_id).await? {
            return Err(CommunityError::MemberNotFound);
        }

        info!(
            member_id,
            community_id,
            removed_by = acting_user.id,
            "Member removed from community"
        );
        Ok(())
    }

    pub async fn rename_community(
        &self,
        new_name: &str,
        community_id: i64,
        acting_user: &User,
    ) -> Result<Community, CommunityError> {
        let mut community = self.managed_community(community_id, acting_user).await?;
        let name = validate_name(new_name)?;

        if self.communities.name_exists(&name, Some(community_id)).await? {
            return Err(CommunityError::NameAlreadyExists);
        }

        let updated = self
            .communities
            .rename(community_id, &name)
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("name") {
                    CommunityError::NameAlreadyExists
                } else {
                    CommunityError::Store(e)
                }
            })?;
        if !updated {
            return Err(CommunityError::NotFound);
        }

        info!(community_id, renamed_by = acting_user.id, "Community renamed");
        community.name = name;
        Ok(community)
    }

    pub async fn update_boundary(
        &self,
        boundary: &str,
        community_id: i64,
        acting_user: &User,
    ) -> Result<Community, CommunityError> {
        let mut community = self.managed_community(community_id, acting_user).await?;
        let boundary_data = self.normalize_boundary(boundary)?;

        if !self
            .communities
            .update_boundary(community_id, &boundary_data)
            .await?
        {
            return Err(CommunityError::NotFound);
        }

        info!(community_id, updated_by = acting_user.id, "Community boundary updated");
        community.boundary_data = boundary_data;
        Ok(community)
    }

    /// Adds a user who has no community to the one behind `slug`.
    ///
    /// Quota checks are the caller's job.
    pub async fn join_by_invite(
        &self,
        slug: &str,
        acting_user: &mut User,
    ) -> Result<Community, CommunityError> {
        let community = self.get_by_invite_slug(slug).await?;
        self.join(&community, acting_user).await?;
        Ok(community)
    }

    /// Adds `acting_user` to an already-resolved community.
    pub async fn join(
        &self,
        community: &Community,
        acting_user: &mut User,
    ) -> Result<(), CommunityError> {
        if acting_user.community_id.is_some() {
            return Err(CommunityError::AlreadyMember);
        }

        let role = if acting_user.role == Role::Business {
            Role::Business
        } else {
            Role::Member
        };
        if !self
            .users
            .set_membership(acting_user.id, Some(community.id), role)
            .await?
        {
            return Err(CommunityError::MemberNotFound);
        }

        acting_user.community_id = Some(community.id);
        acting_user.role = role;

        info!(
            user_id = acting_user.id,
            community_id = community.id,
            "User joined community by invite"
        );
        Ok(())
    }

    pub async fn leave_community(&self, acting_user: &mut User) -> Result<(), CommunityError> {
        let community_id = acting_user.community_id.ok_or(CommunityError::NotMember)?;
        self.users.clear_community(acting_user.id).await?;
        acting_user.community_id = None;

        info!(user_id = acting_user.id, community_id, "User left community");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, CommunityError> {
    let name = sanitize_plain_text(name.trim());
    let name = name.trim();
    if name.is_empty() {
        return Err(CommunityError::NameRequired);
    }
    if name.chars().count() > MAX_COMMUNITY_NAME_LENGTH {
        return Err(CommunityError::NameTooLong);
    }
    Ok(name.to_string())
}
