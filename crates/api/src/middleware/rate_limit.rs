//! Rate limiting middleware.
//!
//! Per-user request quotas on authenticated routes, backed by a keyed
//! GCRA limiter.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use serde_json::json;
use std::num::NonZeroU32;

use crate::app::AppState;
use crate::middleware::user_auth::SessionAuth;

type UserRateLimiter = RateLimiter<i64, DefaultKeyedStateStore<i64>, DefaultClock>;

/// Rate limiter state shared across all requests, keyed by user id.
pub struct RateLimiterState {
    limiter: UserRateLimiter,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    pub fn new(rate_limit_per_minute: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(rate_limit_per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute: rate_limit_per_minute.get(),
        }
    }

    /// Returns `Err(retry_after_secs)` when the user is over quota.
    pub fn check(&self, user_id: i64) -> Result<(), u64> {
        self.limiter.check_key(&user_id).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }

    /// Drops state for users whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }

    pub fn tracked_users(&self) -> usize {
        self.limiter.len()
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_users", &self.tracked_users())
            .finish()
    }
}

/// Applies the per-user quota.
///
/// Must run after [`require_user_auth`](super::user_auth::require_user_auth)
/// so the session is in the request extensions.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let user_id = match req.extensions().get::<SessionAuth>() {
        Some(auth) => auth.user_id,
        None => return next.run(req).await,
    };

    if let Some(ref rate_limiter) = state.rate_limiter {
        if let Err(retry_after) = rate_limiter.check(user_id) {
            tracing::warn!(user_id, retry_after, "Rate limit exceeded");
            return rate_limited_response(rate_limiter.rate_limit_per_minute(), retry_after);
        }
    }

    next.run(req).await
}

fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retry_after": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(per_minute: u32) -> RateLimiterState {
        RateLimiterState::new(NonZeroU32::new(per_minute).unwrap())
    }

    #[test]
    fn test_rate_limiter_allows_within_quota() {
        let state = limiter(5);
        for i in 0..5 {
            assert!(state.check(42).is_ok(), "Request {} should be allowed", i);
        }
        assert!(state.check(42).is_err());
    }

    #[test]
    fn test_rate_limiter_retry_after_at_least_one_second() {
        let state = limiter(1);
        assert!(state.check(1).is_ok());
        assert!(state.check(1).unwrap_err() >= 1);
    }

    #[test]
    fn test_rate_limiter_users_independent() {
        let state = limiter(1);
        assert!(state.check(1).is_ok());
        assert!(state.check(2).is_ok());
        assert!(state.check(1).is_err());
        assert!(state.check(2).is_err());
        assert!(state.check(3).is_ok());
        assert_eq!(state.tracked_users(), 3);
    }

    #[test]
    fn test_rate_limiter_debug() {
        let state = limiter(100);
        let debug = format!("{:?}", state);
        assert!(debug.contains("rate_limit_per_minute: 100"));
    }

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(100, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }
}
