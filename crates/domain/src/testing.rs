//! In-memory store implementations for tests.
//!
//! One [`InMemoryStore`] implements every store trait over a single
//! `RwLock`-guarded state, so multi-entity writes such as
//! `create_with_admin` are atomic just like the SQL transaction they stand
//! in for. Unique constraints carry the same names as the PostgreSQL schema.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::models::{
    Alert, AuthoredAlert, Business, Community, NewAlert, NewBusiness, NewCommunity, NewUser,
    Role, User,
};
use crate::models::community::{DEFAULT_MAX_ALERTS, DEFAULT_MAX_MEMBERS};
use crate::stores::{
    AlertStore, BusinessStore, CommunityStore, StoreHealth, StoreResult, Stores, UserStore,
};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
    communities: BTreeMap<i64, Community>,
    alerts: BTreeMap<i64, Alert>,
    businesses: BTreeMap<i64, Business>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn authored(&self, alert: &Alert) -> AuthoredAlert {
        AuthoredAlert {
            alert: alert.clone(),
            author_name: self.users.get(&alert.user_id).map(|u| u.display_name.clone()),
        }
    }
}

/// Thread-safe in-memory backing for all stores.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bundles this store behind every store trait.
    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            users: self.clone(),
            communities: self.clone(),
            alerts: self.clone(),
            businesses: self.clone(),
            health: self.clone(),
        }
    }

    /// Makes every subsequent operation fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }

    /// Inserts an alert with an arbitrary timestamp and resolved flag.
    pub async fn seed_alert(
        &self,
        community_id: i64,
        user_id: i64,
        timestamp: DateTime<Utc>,
        is_resolved: bool,
    ) -> Alert {
        let mut state = self.state.write().await;
        let id = state.next_id();
        let alert = Alert {
            id,
            community_id,
            user_id,
            category: "Community".to_string(),
            description: format!("seeded alert {}", id),
            latitude: 0.0,
            longitude: 0.0,
            timestamp,
            is_resolved,
            is_premium_feature: false,
        };
        state.alerts.insert(id, alert.clone());
        alert
    }

    /// Deletes a user row outright, leaving their alerts behind.
    pub async fn remove_user(&self, user_id: i64) {
        self.state.write().await.users.remove(&user_id);
    }

    pub async fn set_business_active(&self, business_id: i64, active: bool) {
        if let Some(business) = self.state.write().await.businesses.get_mut(&business_id) {
            business.is_active = active;
        }
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn community_count(&self) -> usize {
        self.state.read().await.communities.len()
    }

    pub async fn alert(&self, id: i64) -> Option<Alert> {
        self.state.read().await.alerts.get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        self.check()?;
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> StoreResult<User> {
        self.check()?;
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let id = state.next_id();
        let user = User {
            id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            display_name: new_user.display_name,
            avatar_url: new_user.avatar_url,
            community_id: new_user.community_id,
            business_id: new_user.business_id,
            role: new_user.role,
            subscription_tier: new_user.subscription_tier,
            created_at: Utc::now(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn set_membership(
        &self,
        user_id: i64,
        community_id: Option<i64>,
        role: Role,
    ) -> StoreResult<bool> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.community_id = community_id;
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_community(&self, user_id: i64) -> StoreResult<bool> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.community_id = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        user_id: i64,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> StoreResult<Option<User>> {
        self.check()?;
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(&user_id).map(|user| {
            user.display_name = display_name.to_string();
            user.avatar_url = avatar_url.map(str::to_string);
            user.clone()
        }))
    }

    async fn list_by_community(&self, community_id: i64) -> StoreResult<Vec<User>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.community_id == Some(community_id))
            .cloned()
            .collect())
    }

    async fn count_by_community(&self, community_id: i64) -> StoreResult<i64> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.community_id == Some(community_id))
            .count() as i64)
    }
}

#[async_trait::async_trait]
impl CommunityStore for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Community>> {
        self.check()?;
        Ok(self.state.read().await.communities.get(&id).cloned())
    }

    async fn find_by_invite_slug(&self, slug: &str) -> StoreResult<Option<Community>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .communities
            .values()
            .find(|c| c.invite_slug == slug)
            .cloned())
    }

    async fn name_exists(&self, name: &str, excluding_id: Option<i64>) -> StoreResult<bool> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .communities
            .values()
            .any(|c| c.name == name && Some(c.id) != excluding_id))
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.communities.values().any(|c| c.invite_slug == slug))
    }

    async fn create_with_admin(&self, new_community: NewCommunity) -> StoreResult<Community> {
        self.check()?;
        let mut state = self.state.write().await;

        if state.communities.values().any(|c| c.name == new_community.name) {
            return Err(StoreError::UniqueViolation("communities_name_key".to_string()));
        }
        if state
            .communities
            .values()
            .any(|c| c.invite_slug == new_community.invite_slug)
        {
            return Err(StoreError::UniqueViolation(
                "communities_invite_slug_key".to_string(),
            ));
        }
        if !state.users.contains_key(&new_community.admin_user_id) {
            return Err(StoreError::Backend(
                "admin user does not exist".to_string(),
            ));
        }

        let id = state.next_id();
        let community = Community {
            id,
            name: new_community.name,
            admin_user_id: new_community.admin_user_id,
            invite_slug: new_community.invite_slug,
            subscription_plan: new_community.subscription_plan,
            boundary_data: new_community.boundary_data,
            business_id: new_community.business_id,
            max_alerts: DEFAULT_MAX_ALERTS,
            max_members: DEFAULT_MAX_MEMBERS,
            created_at: Utc::now(),
        };
        state.communities.insert(id, community.clone());

        if let Some(admin) = state.users.get_mut(&community.admin_user_id) {
            admin.community_id = Some(id);
            admin.role = Role::Admin;
        }

        Ok(community)
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<bool> {
        self.check()?;
        let mut state = self.state.write().await;
        if state.communities.values().any(|c| c.name == name && c.id != id) {
            return Err(StoreError::UniqueViolation("communities_name_key".to_string()));
        }
        match state.communities.get_mut(&id) {
            Some(community) => {
                community.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_boundary(&self, id: i64, boundary_data: &str) -> StoreResult<bool> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.communities.get_mut(&id) {
            Some(community) => {
                community.boundary_data = boundary_data.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_business(&self, business_id: i64) -> StoreResult<Vec<Community>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .communities
            .values()
            .filter(|c| c.business_id == Some(business_id))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryStore {
    async fn insert(&self, new_alert: NewAlert) -> StoreResult<Alert> {
        self.check()?;
        let mut state = self.state.write().await;
        let id = state.next_id();
        let alert = Alert {
            id,
            community_id: new_alert.community_id,
            user_id: new_alert.user_id,
            category: new_alert.category,
            description: new_alert.description,
            latitude: new_alert.latitude,
            longitude: new_alert.longitude,
            timestamp: new_alert.timestamp,
            is_resolved: false,
            is_premium_feature: false,
        };
        state.alerts.insert(id, alert.clone());
        Ok(alert)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Alert>> {
        self.check()?;
        Ok(self.state.read().await.alerts.get(&id).cloned())
    }

    async fn find_with_author(&self, id: i64) -> StoreResult<Option<AuthoredAlert>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.alerts.get(&id).map(|a| state.authored(a)))
    }

    async fn list_for_community(
        &self,
        community_id: i64,
        include_resolved: bool,
    ) -> StoreResult<Vec<AuthoredAlert>> {
        self.check()?;
        let state = self.state.read().await;
        let mut alerts: Vec<&Alert> = state
            .alerts
            .values()
            .filter(|a| a.community_id == community_id)
            .filter(|a| include_resolved || !a.is_resolved)
            .collect();
        // Newest first; ties broken by id like the SQL ORDER BY.
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(alerts.into_iter().map(|a| state.authored(a)).collect())
    }

    async fn mark_resolved(&self, id: i64) -> StoreResult<bool> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.alerts.get_mut(&id) {
            Some(alert) => {
                alert.is_resolved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_between(
        &self,
        community_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<i64> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .alerts
            .values()
            .filter(|a| a.community_id == community_id)
            .filter(|a| a.timestamp >= from && a.timestamp < until)
            .count() as i64)
    }
}

#[async_trait::async_trait]
impl BusinessStore for InMemoryStore {
    async fn insert(&self, new_business: NewBusiness) -> StoreResult<Business> {
        self.check()?;
        let mut state = self.state.write().await;
        let id = state.next_id();
        let business = Business {
            id,
            name: new_business.name,
            logo_url: new_business.logo_url,
            primary_color: new_business.primary_color,
            contact_email: new_business.contact_email,
            subscription_tier: new_business.subscription_tier,
            is_active: true,
            created_at: Utc::now(),
        };
        state.businesses.insert(id, business.clone());
        Ok(business)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<Business>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.businesses.get(&id).filter(|b| b.is_active).cloned())
    }

    async fn find_active_for_community(
        &self,
        community_id: i64,
    ) -> StoreResult<Option<Business>> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .communities
            .get(&community_id)
            .and_then(|c| c.business_id)
            .and_then(|business_id| state.businesses.get(&business_id))
            .filter(|b| b.is_active)
            .cloned())
    }
}

#[async_trait::async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}
