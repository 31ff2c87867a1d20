//! Integration tests for invite links.

mod common;

use axum::http::StatusCode;
use common::{TestApp, TEST_PASSWORD};
use domain::models::{NewUser, Role, SubscriptionTier};
use domain::stores::UserStore;
use serde_json::json;

/// Fills a community up to `count` members directly in the store.
async fn fill_community(app: &TestApp, community_id: i64, count: usize) {
    let users = app.store.stores().users;
    let existing = users.count_by_community(community_id).await.unwrap() as usize;
    for i in existing..count {
        users
            .insert(NewUser {
                email: format!("filler{}@example.com", i),
                password_hash: "unused".to_string(),
                display_name: format!("Filler {}", i),
                avatar_url: None,
                community_id: Some(community_id),
                business_id: None,
                role: Role::Member,
                subscription_tier: SubscriptionTier::Free,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_preview_invite_is_public() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("admin@example.com", "Jacaranda Close").await;
    let slug = community["invite_slug"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/v1/invites/{}", slug), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jacaranda Close");
    assert_eq!(body["member_count"], 1);
    assert_eq!(body["branding"]["business_name"], "iZwi");
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn test_preview_unknown_invite() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/invites/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Community not found");
}

#[tokio::test]
async fn test_register_through_invite_joins_as_member() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("admin@example.com", "Protea Park").await;
    let slug = community["invite_slug"].as_str().unwrap();

    let (_, user) = app.register("newcomer@example.com", Some(slug)).await;

    assert_eq!(user["community_id"], community["id"]);
    assert_eq!(user["role"], "member");
}

#[tokio::test]
async fn test_existing_user_joins_by_invite() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("admin@example.com", "Baobab Row").await;
    let slug = community["invite_slug"].as_str().unwrap();
    let (token, _) = app.register("drifter@example.com", None).await;

    let (status, body) = app
        .post(&format!("/api/v1/invites/{}/join", slug), Some(&token), json!({}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], community["id"]);
    assert_eq!(body["member_count"], 2);
    assert_eq!(body["is_admin"], false);

    let (_, me) = app.get("/api/v1/me", Some(&token)).await;
    assert_eq!(me["community_id"], community["id"]);
    assert_eq!(me["role"], "member");
}

#[tokio::test]
async fn test_join_requires_login() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("admin@example.com", "Gated").await;
    let slug = community["invite_slug"].as_str().unwrap();

    let (status, _) = app
        .post(&format!("/api/v1/invites/{}/join", slug), None, json!({}))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_join_while_member_elsewhere() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("a@example.com", "Here").await;
    let (other_token, _) = app.admin_with_community("b@example.com", "There").await;
    let slug = community["invite_slug"].as_str().unwrap();

    let (status, body) = app
        .post(&format!("/api/v1/invites/{}/join", slug), Some(&other_token), json!({}))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You already belong to a community");
}

#[tokio::test]
async fn test_full_community_refuses_new_members() {
    let app = TestApp::new();
    let (_, community) = app.admin_with_community("admin@example.com", "Packed").await;
    let community_id = community["id"].as_i64().unwrap();
    let slug = community["invite_slug"].as_str().unwrap();
    fill_community(&app, community_id, 50).await;

    let (token, _) = app.register("late@example.com", None).await;
    let (status, body) = app
        .post(&format!("/api/v1/invites/{}/join", slug), Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "limit_exceeded");
    assert!(body["message"].as_str().unwrap().contains("(50)"));

    // Registration through the same invite is refused before any account exists.
    let users_before = app.store.user_count().await;
    let (status, _) = app
        .post(
            "/api/v1/auth/register",
            None,
            json!({
                "email": "later@example.com",
                "password": TEST_PASSWORD,
                "invite_slug": slug
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.user_count().await, users_before);
}
