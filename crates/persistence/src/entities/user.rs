//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, SubscriptionTier};
use sqlx::FromRow;

/// Database enum for `user_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum RoleDb {
    Admin,
    Member,
    Business,
}

impl From<RoleDb> for Role {
    fn from(db_role: RoleDb) -> Self {
        match db_role {
            RoleDb::Admin => Role::Admin,
            RoleDb::Member => Role::Member,
            RoleDb::Business => Role::Business,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => RoleDb::Admin,
            Role::Member => RoleDb::Member,
            Role::Business => RoleDb::Business,
        }
    }
}

/// Database enum for `subscription_tier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subscription_tier", rename_all = "lowercase")]
pub enum SubscriptionTierDb {
    Free,
    Premium,
}

impl From<SubscriptionTierDb> for SubscriptionTier {
    fn from(db_tier: SubscriptionTierDb) -> Self {
        match db_tier {
            SubscriptionTierDb::Free => SubscriptionTier::Free,
            SubscriptionTierDb::Premium => SubscriptionTier::Premium,
        }
    }
}

impl From<SubscriptionTier> for SubscriptionTierDb {
    fn from(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => SubscriptionTierDb::Free,
            SubscriptionTier::Premium => SubscriptionTierDb::Premium,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub community_id: Option<i64>,
    pub business_id: Option<i64>,
    pub role: RoleDb,
    pub subscription_tier: SubscriptionTierDb,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            display_name: entity.display_name,
            avatar_url: entity.avatar_url,
            community_id: entity.community_id,
            business_id: entity.business_id,
            role: entity.role.into(),
            subscription_tier: entity.subscription_tier.into(),
            created_at: entity.created_at,
        }
    }
}
