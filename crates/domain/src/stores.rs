//! Store traits implemented by the persistence layer.
//!
//! Services depend only on these traits, so the PostgreSQL repositories and
//! the in-memory stores in [`crate::testing`] are interchangeable.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::errors::StoreError;
use crate::models::{
    Alert, AuthoredAlert, Business, Community, NewAlert, NewBusiness, NewCommunity, NewUser,
    Role, User,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Exact match on the stored (normalized) email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fails with `UniqueViolation` when the email is taken.
    async fn insert(&self, new_user: NewUser) -> StoreResult<User>;

    /// Sets community reference and role together. Returns false if the
    /// user does not exist.
    async fn set_membership(
        &self,
        user_id: i64,
        community_id: Option<i64>,
        role: Role,
    ) -> StoreResult<bool>;

    /// Clears the community reference, leaving the role as is.
    async fn clear_community(&self, user_id: i64) -> StoreResult<bool>;

    async fn update_profile(
        &self,
        user_id: i64,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> StoreResult<Option<User>>;

    async fn list_by_community(&self, community_id: i64) -> StoreResult<Vec<User>>;

    async fn count_by_community(&self, community_id: i64) -> StoreResult<i64>;
}

#[async_trait::async_trait]
pub trait CommunityStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Community>>;

    async fn find_by_invite_slug(&self, slug: &str) -> StoreResult<Option<Community>>;

    /// Case-sensitive exact match, optionally ignoring one community.
    async fn name_exists(&self, name: &str, excluding_id: Option<i64>) -> StoreResult<bool>;

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool>;

    /// Inserts the community and promotes its admin (role Admin, community
    /// reference set) atomically. Either both writes land or neither does.
    async fn create_with_admin(&self, new_community: NewCommunity) -> StoreResult<Community>;

    async fn rename(&self, id: i64, name: &str) -> StoreResult<bool>;

    async fn update_boundary(&self, id: i64, boundary_data: &str) -> StoreResult<bool>;

    async fn list_by_business(&self, business_id: i64) -> StoreResult<Vec<Community>>;
}

#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, new_alert: NewAlert) -> StoreResult<Alert>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Alert>>;

    async fn find_with_author(&self, id: i64) -> StoreResult<Option<AuthoredAlert>>;

    /// Newest first. Resolved alerts only when `include_resolved`.
    async fn list_for_community(
        &self,
        community_id: i64,
        include_resolved: bool,
    ) -> StoreResult<Vec<AuthoredAlert>>;

    async fn mark_resolved(&self, id: i64) -> StoreResult<bool>;

    /// Alerts with `from <= timestamp < until`.
    async fn count_between(
        &self,
        community_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<i64>;
}

#[async_trait::async_trait]
pub trait BusinessStore: Send + Sync {
    async fn insert(&self, new_business: NewBusiness) -> StoreResult<Business>;

    async fn find_active(&self, id: i64) -> StoreResult<Option<Business>>;

    /// Active business owning the community, if any.
    async fn find_active_for_community(&self, community_id: i64)
        -> StoreResult<Option<Business>>;
}

/// Liveness of the backing store.
#[async_trait::async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// All stores a request may touch, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub communities: Arc<dyn CommunityStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub businesses: Arc<dyn BusinessStore>,
    pub health: Arc<dyn StoreHealth>,
}
