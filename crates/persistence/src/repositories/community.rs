//! Community repository for database operations.

use domain::models::{Community, NewCommunity};
use domain::stores::{CommunityStore, StoreResult};
use sqlx::PgPool;

use crate::entities::{CommunityEntity, RoleDb, SubscriptionTierDb};
use crate::metrics::QueryTimer;

const COMMUNITY_COLUMNS: &str = "id, name, admin_user_id, invite_slug, subscription_plan, \
                                 boundary_data, business_id, max_alerts, max_members, created_at";

/// Repository for community-related database operations.
#[derive(Clone)]
pub struct CommunityRepository {
    pool: PgPool,
}

impl CommunityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Community row and admin promotion land together or not at all.
    async fn insert_with_admin(
        &self,
        new_community: &NewCommunity,
    ) -> Result<CommunityEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let community = sqlx::query_as::<_, CommunityEntity>(&format!(
            r#"
            INSERT INTO communities (name, admin_user_id, invite_slug, subscription_plan,
                                     boundary_data, business_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COMMUNITY_COLUMNS
        ))
        .bind(&new_community.name)
        .bind(new_community.admin_user_id)
        .bind(&new_community.invite_slug)
        .bind(SubscriptionTierDb::from(new_community.subscription_plan))
        .bind(&new_community.boundary_data)
        .bind(new_community.business_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET community_id = $1, role = $2 WHERE id = $3")
            .bind(community.id)
            .bind(RoleDb::Admin)
            .bind(new_community.admin_user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(community)
    }
}

#[async_trait::async_trait]
impl CommunityStore for CommunityRepository {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Community>> {
        let timer = QueryTimer::new("find_community_by_id");
        let result = sqlx::query_as::<_, CommunityEntity>(&format!(
            "SELECT {} FROM communities WHERE id = $1",
            COMMUNITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn find_by_invite_slug(&self, slug: &str) -> StoreResult<Option<Community>> {
        let timer = QueryTimer::new("find_community_by_invite_slug");
        let result = sqlx::query_as::<_, CommunityEntity>(&format!(
            "SELECT {} FROM communities WHERE invite_slug = $1",
            COMMUNITY_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn name_exists(&self, name: &str, excluding_id: Option<i64>) -> StoreResult<bool> {
        let timer = QueryTimer::new("community_name_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM communities
                WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(excluding_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?)
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("community_slug_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM communities WHERE invite_slug = $1)",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?)
    }

    async fn create_with_admin(&self, new_community: NewCommunity) -> StoreResult<Community> {
        let timer = QueryTimer::new("create_community_with_admin");
        let result = self.insert_with_admin(&new_community).await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn rename(&self, id: i64, name: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("rename_community");
        let result = sqlx::query("UPDATE communities SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn update_boundary(&self, id: i64, boundary_data: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("update_community_boundary");
        let result = sqlx::query("UPDATE communities SET boundary_data = $1 WHERE id = $2")
            .bind(boundary_data)
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn list_by_business(&self, business_id: i64) -> StoreResult<Vec<Community>> {
        let timer = QueryTimer::new("list_communities_by_business");
        let result = sqlx::query_as::<_, CommunityEntity>(&format!(
            "SELECT {} FROM communities WHERE business_id = $1 ORDER BY id",
            COMMUNITY_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }
}
