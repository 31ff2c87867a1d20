//! Store-level metrics: query timings, query failures and pool gauges.
//!
//! Every repository call is wrapped in a [`QueryTimer`]. Failures are
//! counted by class so constraint trouble (duplicate names, over-wide
//! columns) can be told apart from an unreachable database.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres `string_data_right_truncation`.
const VALUE_TOO_LONG: &str = "22001";

/// Pool gauges, sampled by the server's housekeeping task.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
    gauge!("database_connections_max").set(pool.options().get_max_connections() as f64);
}

/// Coarse failure class used as a metric label.
pub fn error_class(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => "unique_violation",
            Some(VALUE_TOO_LONG) => "value_too_long",
            _ => "database",
        },
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection",
        _ => "other",
    }
}

/// Times one store query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_community_by_invite_slug");
/// let result = sqlx::query_as::<_, CommunityEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// Ok(result?.map(Into::into))
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the duration labelled with the outcome, and counts failures.
    pub fn finish<T>(self, result: &Result<T, sqlx::Error>) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let outcome = if result.is_ok() { "ok" } else { "error" };
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name,
            "outcome" => outcome
        )
        .record(elapsed);

        if let Err(err) = result {
            counter!(
                "database_query_errors_total",
                "query" => self.query_name,
                "class" => error_class(err)
            )
            .increment(1);
            tracing::debug!(query = self.query_name, error = %err, "Store query failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_class() {
        assert_eq!(error_class(&sqlx::Error::RowNotFound), "row_not_found");
        assert_eq!(error_class(&sqlx::Error::PoolTimedOut), "pool");
        assert_eq!(error_class(&sqlx::Error::PoolClosed), "pool");
        assert_eq!(
            error_class(&sqlx::Error::Protocol("unexpected message".to_string())),
            "other"
        );
    }

    #[test]
    fn test_finish_without_recorder() {
        // Without a global recorder both paths are no-ops.
        let ok: Result<i64, sqlx::Error> = Ok(3);
        QueryTimer::new("count_members").finish(&ok);

        let failed: Result<i64, sqlx::Error> = Err(sqlx::Error::PoolTimedOut);
        let timer = QueryTimer::new("count_alerts_in_period");
        assert_eq!(timer.query_name, "count_alerts_in_period");
        timer.finish(&failed);
    }
}
