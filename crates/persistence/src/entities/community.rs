//! Community entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::user::SubscriptionTierDb;

/// Database row mapping for the communities table.
#[derive(Debug, Clone, FromRow)]
pub struct CommunityEntity {
    pub id: i64,
    pub name: String,
    pub admin_user_id: i64,
    pub invite_slug: String,
    pub subscription_plan: SubscriptionTierDb,
    pub boundary_data: String,
    pub business_id: Option<i64>,
    pub max_alerts: i32,
    pub max_members: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CommunityEntity> for domain::models::Community {
    fn from(entity: CommunityEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            admin_user_id: entity.admin_user_id,
            invite_slug: entity.invite_slug,
            subscription_plan: entity.subscription_plan.into(),
            boundary_data: entity.boundary_data,
            business_id: entity.business_id,
            max_alerts: entity.max_alerts,
            max_members: entity.max_members,
            created_at: entity.created_at,
        }
    }
}
