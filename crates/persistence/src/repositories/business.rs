//! Business repository for database operations.

use domain::models::{Business, NewBusiness};
use domain::stores::{BusinessStore, StoreResult};
use sqlx::PgPool;

use crate::entities::{BusinessEntity, SubscriptionTierDb};
use crate::metrics::QueryTimer;

/// Repository for business-related database operations.
#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BusinessStore for BusinessRepository {
    async fn insert(&self, new_business: NewBusiness) -> StoreResult<Business> {
        let timer = QueryTimer::new("create_business");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            INSERT INTO businesses (name, logo_url, primary_color, contact_email, subscription_tier)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, logo_url, primary_color, contact_email, subscription_tier,
                      is_active, created_at
            "#,
        )
        .bind(&new_business.name)
        .bind(&new_business.logo_url)
        .bind(&new_business.primary_color)
        .bind(&new_business.contact_email)
        .bind(SubscriptionTierDb::from(new_business.subscription_tier))
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<Business>> {
        let timer = QueryTimer::new("find_active_business");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            SELECT id, name, logo_url, primary_color, contact_email, subscription_tier,
                   is_active, created_at
            FROM businesses
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn find_active_for_community(
        &self,
        community_id: i64,
    ) -> StoreResult<Option<Business>> {
        let timer = QueryTimer::new("find_active_business_for_community");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            SELECT b.id, b.name, b.logo_url, b.primary_color, b.contact_email,
                   b.subscription_tier, b.is_active, b.created_at
            FROM businesses b
            JOIN communities c ON c.business_id = b.id
            WHERE c.id = $1 AND b.is_active = TRUE
            "#,
        )
        .bind(community_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }
}
