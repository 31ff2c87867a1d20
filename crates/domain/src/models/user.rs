//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::subscription::SubscriptionTier;

/// Role a user holds within their community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
    Business,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Business => "business",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "business" => Ok(Role::Business),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub community_id: Option<i64>,
    pub business_id: Option<i64>,
    pub role: Role,
    pub subscription_tier: SubscriptionTier,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Business role, or attached to a business regardless of role.
    pub fn is_business_user(&self) -> bool {
        self.role == Role::Business || self.business_id.is_some()
    }

    /// Premium tier, or any business-role account.
    pub fn has_premium_access(&self) -> bool {
        self.subscription_tier == SubscriptionTier::Premium || self.role == Role::Business
    }
}

/// Values for inserting a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub community_id: Option<i64>,
    pub business_id: Option<i64>,
    pub role: Role,
    pub subscription_tier: SubscriptionTier,
}
