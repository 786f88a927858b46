//! HTTP-level integration tests for the user account endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// User creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/users",
        serde_json::json!({"username": "dana", "email": "dana@campus.test"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "dana");
    assert_eq!(json["data"]["email"], "dana@campus.test");
    assert_eq!(json["data"]["is_active"], true);
    assert!(json["data"]["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_with_empty_username_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/users",
        serde_json::json!({"username": "  ", "email": "blank@campus.test"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_duplicate_username_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let first = post_json(
        app,
        "/api/v1/users",
        serde_json::json!({"username": "twice", "email": "one@campus.test"}),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let second = post_json(
        app,
        "/api/v1/users",
        serde_json::json!({"username": "twice", "email": "two@campus.test"}),
    )
    .await;

    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// User lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_user_by_id(pool: PgPool) {
    let user = common::create_user(&pool, "lookup").await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/users/{}", user.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["email"], "lookup@campus.test");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_nonexistent_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/users/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "USER_NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users(pool: PgPool) {
    common::create_user(&pool, "first").await;
    common::create_user(&pool, "second").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/users").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);

    let names: Vec<&str> = users
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"first"));
    assert!(names.contains(&"second"));
}
