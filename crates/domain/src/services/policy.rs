//! Access and subscription-limit policy.
//!
//! Role predicates live here so every service asks the same question the
//! same way. Quotas come from the community's plan; a Free community may
//! hold 50 members and post 100 alerts per UTC calendar month.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use crate::errors::PolicyError;
use crate::models::{
    Community, CommunityUsage, LimitedAction, SubscriptionLimits, SubscriptionTier, UpgradePrompt,
    User,
};
use crate::stores::{AlertStore, UserStore};

/// Admins and business users may manage membership and settings.
pub fn can_moderate(user: &User) -> bool {
    user.is_admin() || user.is_business_user()
}

/// Only admins may resolve alerts.
pub fn can_resolve(user: &User) -> bool {
    user.is_admin()
}

/// True if `community` is the user's own or belongs to the user's business.
pub fn within_reach(user: &User, community: &Community) -> bool {
    user.community_id == Some(community.id)
        || (user.business_id.is_some() && community.business_id == user.business_id)
}

pub fn subscription_limits(tier: SubscriptionTier) -> SubscriptionLimits {
    tier.limits()
}

/// Refuses anonymous callers and users without premium access.
pub fn check_premium_access(user: Option<&User>, feature: Option<&str>) -> Result<(), PolicyError> {
    let user = user.ok_or(PolicyError::LoginRequired)?;
    if user.has_premium_access() {
        return Ok(());
    }
    Err(PolicyError::PremiumRequired(premium_message(feature)))
}

pub fn upgrade_prompt(feature: Option<&str>) -> UpgradePrompt {
    UpgradePrompt {
        title: "Premium Feature".to_string(),
        message: premium_message(feature),
        action_text: "Upgrade Now".to_string(),
        action_url: "/upgrade".to_string(),
    }
}

fn premium_message(feature: Option<&str>) -> String {
    let feature = feature
        .filter(|f| !f.is_empty())
        .map(|f| format!(" '{}'", f))
        .unwrap_or_default();
    format!("This{} is a premium feature. Please upgrade your plan.", feature)
}

/// `[first instant of the month, first instant of the next month)` in UTC.
pub fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or(NaiveDate::MIN);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    (
        first.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    )
}

/// Quota checks that need live counts.
pub struct AccessPolicy {
    users: Arc<dyn UserStore>,
    alerts: Arc<dyn AlertStore>,
}

impl AccessPolicy {
    pub fn new(users: Arc<dyn UserStore>, alerts: Arc<dyn AlertStore>) -> Self {
        Self { users, alerts }
    }

    /// Fails with `LimitReached` if `action` would exceed the plan's cap.
    pub async fn check_community_limit(
        &self,
        community: &Community,
        action: LimitedAction,
    ) -> Result<(), PolicyError> {
        self.check_community_limit_at(community, action, Utc::now())
            .await
    }

    pub async fn check_community_limit_at(
        &self,
        community: &Community,
        action: LimitedAction,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyError> {
        let limits = community.subscription_plan.limits();

        match action {
            LimitedAction::AddMember => {
                let members = self.users.count_by_community(community.id).await?;
                if members >= limits.max_community_members {
                    debug!(community_id = community.id, members, "Member limit reached");
                    return Err(PolicyError::LimitReached(format!(
                        "You've reached the maximum number of members ({}) for your plan. Please upgrade to add more members.",
                        limits.max_community_members
                    )));
                }
            }
            LimitedAction::PostAlert => {
                let (from, until) = month_bounds(now);
                let alerts = self.alerts.count_between(community.id, from, until).await?;
                if alerts >= limits.max_alerts_per_month {
                    debug!(community_id = community.id, alerts, "Monthly alert limit reached");
                    return Err(PolicyError::LimitReached(format!(
                        "You've reached the maximum number of alerts ({}) for this month. Please upgrade your plan.",
                        limits.max_alerts_per_month
                    )));
                }
            }
        }

        Ok(())
    }

    /// Members and this month's alerts against the plan's caps.
    pub async fn community_usage(&self, community: &Community) -> Result<CommunityUsage, PolicyError> {
        let limits = community.subscription_plan.limits();
        let (from, until) = month_bounds(Utc::now());

        Ok(CommunityUsage {
            community_id: community.id,
            plan: community.subscription_plan,
            members: self.users.count_by_community(community.id).await?,
            max_members: limits.max_community_members,
            alerts_this_month: self.alerts.count_between(community.id, from, until).await?,
            max_alerts_per_month: limits.max_alerts_per_month,
        })
    }
}
