//! Alert repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{Alert, AuthoredAlert, NewAlert};
use domain::stores::{AlertStore, StoreResult};
use sqlx::PgPool;

use crate::entities::{AlertEntity, AuthoredAlertEntity};
use crate::metrics::QueryTimer;

const ALERT_COLUMNS: &str = "id, community_id, user_id, category, description, latitude, \
                             longitude, timestamp, is_resolved, is_premium_feature";

const AUTHORED_ALERT_SELECT: &str = r#"
    SELECT a.id, a.community_id, a.user_id, a.category, a.description, a.latitude,
           a.longitude, a.timestamp, a.is_resolved, a.is_premium_feature,
           u.display_name AS author_name
    FROM alerts a
    LEFT JOIN users u ON u.id = a.user_id
"#;

/// Repository for alert-related database operations.
#[derive(Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlertStore for AlertRepository {
    async fn insert(&self, new_alert: NewAlert) -> StoreResult<Alert> {
        let timer = QueryTimer::new("create_alert");
        let result = sqlx::query_as::<_, AlertEntity>(&format!(
            r#"
            INSERT INTO alerts (community_id, user_id, category, description, latitude,
                                longitude, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ALERT_COLUMNS
        ))
        .bind(new_alert.community_id)
        .bind(new_alert.user_id)
        .bind(&new_alert.category)
        .bind(&new_alert.description)
        .bind(new_alert.latitude)
        .bind(new_alert.longitude)
        .bind(new_alert.timestamp)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Alert>> {
        let timer = QueryTimer::new("find_alert_by_id");
        let result = sqlx::query_as::<_, AlertEntity>(&format!(
            "SELECT {} FROM alerts WHERE id = $1",
            ALERT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn find_with_author(&self, id: i64) -> StoreResult<Option<AuthoredAlert>> {
        let timer = QueryTimer::new("find_alert_with_author");
        let result = sqlx::query_as::<_, AuthoredAlertEntity>(&format!(
            "{} WHERE a.id = $1",
            AUTHORED_ALERT_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.map(Into::into))
    }

    async fn list_for_community(
        &self,
        community_id: i64,
        include_resolved: bool,
    ) -> StoreResult<Vec<AuthoredAlert>> {
        let timer = QueryTimer::new("list_alerts_for_community");
        let result = sqlx::query_as::<_, AuthoredAlertEntity>(&format!(
            r#"
            {}
            WHERE a.community_id = $1 AND ($2 OR a.is_resolved = FALSE)
            ORDER BY a.timestamp DESC, a.id DESC
            "#,
            AUTHORED_ALERT_SELECT
        ))
        .bind(community_id)
        .bind(include_resolved)
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    async fn mark_resolved(&self, id: i64) -> StoreResult<bool> {
        let timer = QueryTimer::new("resolve_alert");
        let result = sqlx::query("UPDATE alerts SET is_resolved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.finish(&result);
        Ok(result?.rows_affected() > 0)
    }

    async fn count_between(
        &self,
        community_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<i64> {
        let timer = QueryTimer::new("count_alerts_in_period");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM alerts
            WHERE community_id = $1 AND timestamp >= $2 AND timestamp < $3
            "#,
        )
        .bind(community_id)
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await;
        timer.finish(&result);
        Ok(result?)
    }
}
