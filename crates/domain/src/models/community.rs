//! Community domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::subscription::SubscriptionTier;

/// Maximum community name length in characters.
pub const MAX_COMMUNITY_NAME_LENGTH: usize = 100;

/// A named group of users sharing alerts and a boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub admin_user_id: i64,
    pub invite_slug: String,
    pub subscription_plan: SubscriptionTier,
    /// JSON text, or sanitized free text under the lenient boundary policy.
    /// Empty when no boundary has been drawn.
    pub boundary_data: String,
    pub business_id: Option<i64>,
    pub max_alerts: i32,
    pub max_members: i32,
    pub created_at: DateTime<Utc>,
}

/// Values for inserting a community together with its founding admin.
#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub admin_user_id: i64,
    pub invite_slug: String,
    pub subscription_plan: SubscriptionTier,
    pub boundary_data: String,
    pub business_id: Option<i64>,
}

/// Default caps stored on a new community row.
pub const DEFAULT_MAX_ALERTS: i32 = 100;
pub const DEFAULT_MAX_MEMBERS: i32 = 50;

/// How boundary input that is not valid JSON is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Reject with `InvalidBoundaryFormat`.
    #[default]
    Strict,
    /// Store the plain-text sanitized input.
    Lenient,
}

impl FromStr for BoundaryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(BoundaryPolicy::Strict),
            "lenient" => Ok(BoundaryPolicy::Lenient),
            _ => Err(format!("Invalid boundary policy: {}", s)),
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Strict => write!(f, "strict"),
            BoundaryPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_policy_from_str() {
        assert_eq!(BoundaryPolicy::from_str("strict").unwrap(), BoundaryPolicy::Strict);
        assert_eq!(BoundaryPolicy::from_str("LENIENT").unwrap(), BoundaryPolicy::Lenient);
        assert!(BoundaryPolicy::from_str("loose").is_err());
        assert_eq!(BoundaryPolicy::default(), BoundaryPolicy::Strict);
    }
}
