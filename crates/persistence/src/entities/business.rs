//! Business entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::user::SubscriptionTierDb;

/// Database row mapping for the businesses table.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessEntity {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub contact_email: Option<String>,
    pub subscription_tier: SubscriptionTierDb,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessEntity> for domain::models::Business {
    fn from(entity: BusinessEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            logo_url: entity.logo_url,
            primary_color: entity.primary_color,
            contact_email: entity.contact_email,
            subscription_tier: entity.subscription_tier.into(),
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
