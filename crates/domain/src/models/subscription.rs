//! Subscription tiers and the quotas attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier of a user, community or business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
        }
    }

    /// Parses a stored tier; anything unrecognized is Free.
    pub fn parse_or_free(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn limits(&self) -> SubscriptionLimits {
        match self {
            SubscriptionTier::Free => SubscriptionLimits {
                max_alerts_per_month: 100,
                max_community_members: 50,
                max_communities: 1,
                advanced_analytics: false,
                custom_branding: false,
                priority_support: false,
            },
            SubscriptionTier::Premium => SubscriptionLimits {
                max_alerts_per_month: 1000,
                max_community_members: 500,
                max_communities: 10,
                advanced_analytics: true,
                custom_branding: true,
                priority_support: true,
            },
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "premium" => Ok(SubscriptionTier::Premium),
            _ => Err(format!("Invalid subscription tier: {}", s)),
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quotas and feature flags for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionLimits {
    pub max_alerts_per_month: i64,
    pub max_community_members: i64,
    pub max_communities: i64,
    pub advanced_analytics: bool,
    pub custom_branding: bool,
    pub priority_support: bool,
}

/// Mutations gated by a community's quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedAction {
    AddMember,
    PostAlert,
}

/// Standard call to action shown when a premium feature is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePrompt {
    pub title: String,
    pub message: String,
    pub action_text: String,
    pub action_url: String,
}

/// Current consumption of a community against its tier's caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityUsage {
    pub community_id: i64,
    pub plan: SubscriptionTier,
    pub members: i64,
    pub max_members: i64,
    pub alerts_this_month: i64,
    pub max_alerts_per_month: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_limits() {
        let limits = SubscriptionTier::Free.limits();
        assert_eq!(limits.max_alerts_per_month, 100);
        assert_eq!(limits.max_community_members, 50);
        assert_eq!(limits.max_communities, 1);
        assert!(!limits.advanced_analytics);
        assert!(!limits.custom_branding);
        assert!(!limits.priority_support);
    }

    #[test]
    fn test_premium_limits() {
        let limits = SubscriptionTier::Premium.limits();
        assert_eq!(limits.max_alerts_per_month, 1000);
        assert_eq!(limits.max_community_members, 500);
        assert_eq!(limits.max_communities, 10);
        assert!(limits.advanced_analytics && limits.custom_branding && limits.priority_support);
    }

    #[test]
    fn test_unknown_tier_is_free() {
        assert_eq!(SubscriptionTier::parse_or_free("gold"), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse_or_free(""), SubscriptionTier::Free);
        assert_eq!(SubscriptionTier::parse_or_free("Premium"), SubscriptionTier::Premium);
    }
}
