//! HTTP-level integration tests for the `/users` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, link_for, link_headers, patch_json, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

async fn create_user(pool: &PgPool, email: &str, name: &str) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/users",
        json!({"email": email, "name": name, "password": "correct-horse"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_and_get_user(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/users/ada@x.com").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["email"], "ada@x.com");
    assert_eq!(json["name"], "Ada");
    // The password hash must never be serialized.
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_user_returns_409(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/users",
        json!({"email": "ada@x.com", "name": "Imposter", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_email_returns_422(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/users",
        json!({"email": "not-an-email", "password": "correct-horse"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_unknown_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/users/nobody@x.com").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn replace_updates_profile_fields(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/users/ada@x.com",
        json!({"name": "Ada Lovelace", "country": "UK"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Ada Lovelace");
    assert_eq!(json["country"], "UK");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_user_returns_204_then_404(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, "/users/ada@x.com").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, "/users/ada@x.com").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Patch pipeline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_replaces_profile_field(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/users/ada@x.com",
        json!([{"op": "replace", "path": "/name", "value": "Countess"}]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "Countess");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_on_email_returns_422_and_persists_nothing(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool.clone());
    let response = patch_json(
        app,
        "/users/ada@x.com",
        json!([
            {"op": "replace", "path": "/name", "value": "Changed"},
            {"op": "replace", "path": "/email", "value": "new@x.com"}
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/users/ada@x.com").await).await;
    assert_eq!(json["name"], "Ada", "a rejected patch must not persist");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_patch_returns_422(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = patch_json(app, "/users/ada@x.com", json!([])).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_with_unknown_op_returns_400(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/users/ada@x.com",
        json!([{"op": "copy", "path": "/name", "value": "X"}]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn multi_op_patch_is_all_or_nothing(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada").await;

    let app = common::build_test_app(pool.clone());
    // The second operation fails (replace on an absent field), so the
    // first must not stick.
    let response = patch_json(
        app,
        "/users/ada@x.com",
        json!([
            {"op": "replace", "path": "/name", "value": "Changed"},
            {"op": "replace", "path": "/country", "value": "UK"}
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/users/ada@x.com").await).await;
    assert_eq!(json["name"], "Ada");
    assert!(json.get("country").is_none() || json["country"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_unknown_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = patch_json(
        app,
        "/users/nobody@x.com",
        json!([{"op": "replace", "path": "/name", "value": "X"}]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing and pagination links
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_listing_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/users").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_carries_page_envelope_and_links(pool: PgPool) {
    for i in 0..5 {
        create_user(&pool, &format!("user{i}@x.com"), &format!("User {i}")).await;
    }

    let app = common::build_test_app(pool);
    let response = get(app, "/users?page=1&size=2&sort=%2Bemail").await;
    assert_eq!(response.status(), StatusCode::OK);

    let links = link_headers(&response);
    assert_eq!(link_for(&links, "first"), Some("/users?page=0&size=2&sort=%2Bemail"));
    assert_eq!(link_for(&links, "last"), Some("/users?page=2&size=2&sort=%2Bemail"));
    assert_eq!(link_for(&links, "next"), Some("/users?page=2&size=2&sort=%2Bemail"));
    assert_eq!(link_for(&links, "previous"), Some("/users?page=0&size=2&sort=%2Bemail"));
    assert_eq!(link_for(&links, "self"), Some("/users?page=1&size=2&sort=%2Bemail"));

    let json = body_json(response).await;
    assert_eq!(json["page"], 1);
    assert_eq!(json["size"], 2);
    assert_eq!(json["total_elements"], 5);
    assert_eq!(json["total_pages"], 3);
    assert_eq!(json["content"][0]["email"], "user2@x.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listing_filters_by_substring(pool: PgPool) {
    create_user(&pool, "ada@x.com", "Ada Lovelace").await;
    create_user(&pool, "grace@x.com", "Grace Hopper").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/users?name=hopper").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total_elements"], 1);
    assert_eq!(json["content"][0]["email"], "grace@x.com");
}
