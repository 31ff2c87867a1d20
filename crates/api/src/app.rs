use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::{
    AccessPolicy, AlertLedger, BusinessRegistry, CommunityRegistry, CommunitySettings,
    IdentityService,
};
use domain::stores::Stores;
use shared::jwt::JwtConfig;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{alerts, auth, communities, health, invites, subscription, users};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
    pub jwt: Arc<JwtConfig>,
    pub community_settings: CommunitySettings,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, jwt: JwtConfig) -> Self {
        let rate_limiter = NonZeroU32::new(config.security.rate_limit_per_minute)
            .map(|per_minute| Arc::new(RateLimiterState::new(per_minute)));
        let community_settings = config.communities.settings();

        Self {
            config: Arc::new(config),
            stores,
            jwt: Arc::new(jwt),
            community_settings,
            rate_limiter,
        }
    }

    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.stores.users.clone())
    }

    pub fn communities(&self) -> CommunityRegistry {
        CommunityRegistry::new(
            self.stores.users.clone(),
            self.stores.communities.clone(),
            self.community_settings,
        )
    }

    pub fn alerts(&self) -> AlertLedger {
        AlertLedger::new(self.stores.alerts.clone(), self.stores.communities.clone())
    }

    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.stores.users.clone(), self.stores.alerts.clone())
    }

    pub fn businesses(&self) -> BusinessRegistry {
        BusinessRegistry::new(self.stores.businesses.clone(), self.stores.communities.clone())
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        // Development default
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Middleware order: auth runs first, then rate limiting (keyed by the session's user).
    let protected_routes = Router::new()
        .route("/api/v1/me", get(users::get_me).put(users::update_me))
        .route("/api/v1/invites/:slug/join", post(invites::join_by_invite))
        .route("/api/v1/communities", post(communities::create_community))
        .route("/api/v1/community", get(communities::get_community))
        .route("/api/v1/community/leave", post(communities::leave_community))
        .route("/api/v1/community/members", get(communities::list_members))
        .route(
            "/api/v1/community/members/:member_id",
            delete(communities::remove_member),
        )
        .route("/api/v1/community/name", put(communities::rename_community))
        .route(
            "/api/v1/community/boundary",
            get(communities::get_boundary).put(communities::update_boundary),
        )
        .route("/api/v1/community/usage", get(communities::get_usage))
        .route("/api/v1/subscription/limits", get(subscription::get_limits))
        .route(
            "/api/v1/alerts",
            get(alerts::list_alerts).post(alerts::create_alert),
        )
        .route("/api/v1/alerts/report", post(alerts::report_alert))
        .route("/api/v1/alerts/:alert_id/resolve", post(alerts::resolve_alert))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/invites/:slug", get(invites::preview_invite))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
