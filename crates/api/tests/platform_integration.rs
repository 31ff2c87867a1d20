//! Integration tests for health probes, metrics, headers and rate limiting.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{request, test_config, TestApp};
use izwi_api::middleware::init_metrics;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check_healthy() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_check_reports_store_outage() {
    let app = TestApp::new();
    app.store.set_failing(true);

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["database"]["connected"], false);

    let (status, _) = app.get("/api/health/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Liveness does not depend on the store.
    let (status, body) = app.get("/api/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_ready_when_store_reachable() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/health/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_store_outage_returns_generic_error() {
    let app = TestApp::new();
    let (token, _) = app.register("outage@example.com", None).await;
    app.store.set_failing(true);

    let (status, body) = app.get("/api/v1/me", Some(&token)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert_eq!(body["message"], "Something went wrong. Please try again later.");
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint_renders_prometheus_text() {
    init_metrics().unwrap();
    let app = TestApp::new();
    app.get("/api/health/live", None).await;

    let (status, text) = app
        .send_text(request(Method::GET, "/metrics", None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("http_requests_total"));
}

// ============================================================================
// Headers
// ============================================================================

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let (_, headers, _) = app
        .send_full(request(Method::GET, "/api/health/live", None, None))
        .await;

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
    assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());
}

#[tokio::test]
async fn test_hsts_when_enabled() {
    let mut config = test_config();
    config.security.hsts_enabled = true;
    let app = TestApp::with_config(config);

    let (_, headers, _) = app
        .send_full(request(Method::GET, "/api/health/live", None, None))
        .await;

    assert!(headers.get(header::STRICT_TRANSPORT_SECURITY).is_some());
}

#[tokio::test]
async fn test_request_id_echoed_or_generated() {
    let app = TestApp::new();

    let mut req = request(Method::GET, "/api/health/live", None, None);
    req.headers_mut()
        .insert("x-request-id", "trace-me-123".parse().unwrap());
    let (_, headers, _) = app.send_full(req).await;
    assert_eq!(headers.get("x-request-id").unwrap(), "trace-me-123");

    let (_, headers, _) = app
        .send_full(request(Method::GET, "/api/health/live", None, None))
        .await;
    assert!(!headers.get("x-request-id").unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_per_user() {
    let mut config = test_config();
    config.security.rate_limit_per_minute = 3;
    let app = TestApp::with_config(config);
    let (first, _) = app.register("busy@example.com", None).await;
    let (second, _) = app.register("calm@example.com", None).await;

    for _ in 0..3 {
        let (status, _) = app.get("/api/v1/me", Some(&first)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = app
        .send_full(request(Method::GET, "/api/v1/me", Some(&first), None))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
    assert!(headers.get(header::RETRY_AFTER).is_some());

    // Quotas are per user.
    let (status, _) = app.get("/api/v1/me", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);

    // Public routes are not limited.
    let (status, _) = app.get("/api/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
}
