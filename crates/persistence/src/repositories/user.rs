//! User repository for database operations.

use domain::models::{NewUser, Role, User};
use domain::stores::{StoreResult, UserStore};
use sqlx::PgPool;

use crate::entities::{RoleDb, SubscriptionTierDb, UserEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, display_name, avatar_url, community_id, \
                            business_id, role, subscription_tier, created_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn insert(&self, new_user: NewUser) -> StoreResult<User> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, avatar_url, community_id,
                               business_id, role, subscription_tier)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(&new_user.avatar_url)
        .bind(new_user.community_id)
        .bind(new_user.business_id)
        .bind(RoleDb::from(new_user.role))
        .bind(SubscriptionTierDb::from(new_user.subscription_tier))
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn set_membership(
        &self,
        user_id: i64,
        community_id: Option<i64>,
        role: Role,
    ) -> StoreResult<bool> {
        let timer = QueryTimer::new("set_user_membership");
        let result = sqlx::query("UPDATE users SET community_id = $1, role = $2 WHERE id = $3")
            .bind(community_id)
            .bind(RoleDb::from(role))
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn clear_community(&self, user_id: i64) -> StoreResult<bool> {
        let timer = QueryTimer::new("clear_user_community");
        let result = sqlx::query("UPDATE users SET community_id = NULL WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        display_name: &str,
        avatar_url: Option<&str>,
    ) -> StoreResult<Option<User>> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET display_name = $1, avatar_url = $2
            WHERE id = $3
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(display_name)
        .bind(avatar_url)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn list_by_community(&self, community_id: i64) -> StoreResult<Vec<User>> {
        let timer = QueryTimer::new("list_users_by_community");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE community_id = $1 ORDER BY id",
            USER_COLUMNS
        ))
        .bind(community_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    async fn count_by_community(&self, community_id: i64) -> StoreResult<i64> {
        let timer = QueryTimer::new("count_users_by_community");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE community_id = $1")
                .bind(community_id)
                .fetch_one(&self.pool)
                .await;
        timer.finish(&result);
        Ok(result?)
    }
}
