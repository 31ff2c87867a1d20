//! Subscription tier routes.

use axum::Json;
use domain::models::{SubscriptionLimits, SubscriptionTier, UpgradePrompt};
use domain::services::{subscription_limits, upgrade_prompt};
use serde::Serialize;

use crate::extractors::CurrentUser;

#[derive(Debug, Clone, Serialize)]
pub struct LimitsResponse {
    pub tier: SubscriptionTier,
    pub limits: SubscriptionLimits,
    /// Present for users without premium access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_prompt: Option<UpgradePrompt>,
}

/// GET /api/v1/subscription/limits
pub async fn get_limits(CurrentUser { user, .. }: CurrentUser) -> Json<LimitsResponse> {
    let upgrade_prompt = (!user.has_premium_access()).then(|| upgrade_prompt(None));

    Json(LimitsResponse {
        tier: user.subscription_tier,
        limits: subscription_limits(user.subscription_tier),
        upgrade_prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_limits_response_shape() {
        let response = LimitsResponse {
            tier: SubscriptionTier::Free,
            limits: subscription_limits(SubscriptionTier::Free),
            upgrade_prompt: Some(upgrade_prompt(None)),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tier"], "free");
        assert_eq!(json["limits"]["max_alerts_per_month"], 100);
        assert_eq!(json["limits"]["max_community_members"], 50);
        assert_eq!(json["upgrade_prompt"]["action_url"], "/upgrade");
    }

    #[test]
    fn test_premium_response_has_no_prompt() {
        let response = LimitsResponse {
            tier: SubscriptionTier::Premium,
            limits: subscription_limits(SubscriptionTier::Premium),
            upgrade_prompt: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["limits"]["max_alerts_per_month"], 1000);
        assert!(json.get("upgrade_prompt").is_none());
    }
}
