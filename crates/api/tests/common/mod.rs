//! Common test utilities for integration tests.
//!
//! The router runs over the in-memory stores from `domain::testing`, so no
//! database is needed.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use domain::models::BoundaryPolicy;
use domain::testing::InMemoryStore;
use izwi_api::{
    app::{create_app, AppState},
    config::{
        CommunitiesConfig, Config, DatabaseConfig, JwtAuthConfig, LoggingConfig, SecurityConfig,
        ServerConfig,
    },
};
use serde_json::{json, Value};
use shared::jwt::JwtConfig;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test configuration signing sessions with HS256 and no rate limiting.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_size: 1_048_576,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            rate_limit_per_minute: 0, // Disable rate limiting for tests
            hsts_enabled: false,
        },
        jwt: JwtAuthConfig {
            private_key: String::new(),
            public_key: String::new(),
            secret: "integration-test-secret-at-least-32-bytes".to_string(),
            session_ttl_secs: 86_400,
            remember_me_ttl_secs: 259_200,
            leeway_secs: 0,
        },
        communities: CommunitiesConfig {
            boundary_policy: BoundaryPolicy::Strict,
            invite_slug_attempts: 5,
        },
    }
}

/// A router plus direct access to the store behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = InMemoryStore::new();
        let jwt = config.jwt.build().expect("test JWT config should build");
        let state = AppState::new(config, store.stores(), jwt);
        Self {
            router: create_app(state.clone()),
            store,
            state,
        }
    }

    /// Sends a request and returns the status, headers and JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn send_full(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// Sends a request and returns the raw body as text.
    pub async fn send_text(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send_full(request).await;
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Registers a user and returns `(token, user)`.
    pub async fn register(&self, email: &str, invite_slug: Option<&str>) -> (String, Value) {
        let mut body = json!({
            "email": email,
            "password": TEST_PASSWORD,
            "display_name": email.split('@').next().unwrap_or("user"),
        });
        if let Some(slug) = invite_slug {
            body["invite_slug"] = json!(slug);
        }

        let (status, body) = self.post("/api/v1/auth/register", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        (
            body["token"]["access_token"].as_str().unwrap().to_string(),
            body["user"].clone(),
        )
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"]["access_token"].as_str().unwrap().to_string()
    }

    /// Creates a community as `token`'s user and returns it.
    pub async fn create_community(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/communities",
                Some(token),
                json!({ "name": name, "boundary": r#"{"type":"Polygon","coordinates":[]}"# }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "community creation failed: {}", body);
        body
    }

    /// An admin with a fresh community, plus the community's invite slug.
    pub async fn admin_with_community(&self, email: &str, name: &str) -> (String, Value) {
        let (token, _) = self.register(email, None).await;
        let community = self.create_community(&token, name).await;
        (token, community)
    }
}

/// Builds a JSON request, optionally authenticated.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A session signed with the test secret but already expired.
pub fn expired_token(user_id: i64) -> String {
    let config = test_config();
    let jwt = JwtConfig::from_secret(&config.jwt.secret, -60, -60, 0).unwrap();
    jwt.issue_session(user_id, false).unwrap().token
}
