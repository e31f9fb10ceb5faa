#![cfg(feature = "sqlite")]

//! Web API Post Tests
//!
//! Integration tests for post endpoints, including secret post visibility.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_post, create_test_app, register_user};
use finboard::SECRET_POST_TITLE;

// ============================================================================
// Create Tests
// ============================================================================

#[tokio::test]
async fn test_create_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/posts")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "Hello",
            "content": "First post"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Hello");
    assert_eq!(body["data"]["content"], "First post");
    assert_eq!(body["data"]["secret"], false);
    assert_eq!(body["data"]["owner_id"], alice.id);
    assert_eq!(body["data"]["author_name"], "alice");
}

#[tokio::test]
async fn test_create_post_requires_login() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/posts")
        .json(&json!({
            "title": "Hello",
            "content": "First post"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_post_empty_title_rejected() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/posts")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "title": "   ",
            "content": "body"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Secret Post Visibility
// ============================================================================

#[tokio::test]
async fn test_anonymous_listing_redacts_secret_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    create_post(&app.server, &alice, "Public", "open", false).await;
    let secret_id = create_post(&app.server, &alice, "Diary", "private", true).await;

    let response = app.server.get("/api/posts").await;

    response.assert_status_ok();
    let body: Value = response.json();
    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(body["meta"]["total"], 2);

    // Newest first
    let secret = &posts[0];
    assert_eq!(secret["id"], secret_id);
    assert_eq!(secret["title"], SECRET_POST_TITLE);
    assert_eq!(secret["content"], "");
    assert_eq!(secret["secret"], true);
    assert_eq!(secret["author_name"], "alice");

    assert_eq!(posts[1]["title"], "Public");
    assert_eq!(posts[1]["content"], "open");
}

#[tokio::test]
async fn test_owner_listing_shows_secret_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    create_post(&app.server, &alice, "Diary", "private", true).await;

    let response = app
        .server
        .get("/api/posts")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"][0]["title"], "Diary");
    assert_eq!(body["data"][0]["content"], "private");
}

#[tokio::test]
async fn test_get_secret_post_denied_to_other_user() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let post_id = create_post(&app.server, &alice, "Diary", "private", true).await;

    let response = app
        .server
        .get(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, bob.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app.server.get(&format!("/api/posts/{}", post_id)).await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_secret_post_by_owner_and_admin() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let admin = register_user(&app.server, "admin").await;
    let post_id = create_post(&app.server, &alice, "Diary", "private", true).await;

    for user in [&alice, &admin] {
        let response = app
            .server
            .get(&format!("/api/posts/{}", post_id))
            .add_header(AUTHORIZATION, user.bearer())
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["title"], "Diary");
        assert_eq!(body["data"]["content"], "private");
    }
}

#[tokio::test]
async fn test_get_missing_post() {
    let app = create_test_app().await;

    let response = app.server.get("/api/posts/999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_token_reads_as_anonymous() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    create_post(&app.server, &alice, "Diary", "private", true).await;

    let response = app
        .server
        .get("/api/posts")
        .add_header(AUTHORIZATION, "Bearer garbage")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"][0]["title"], SECRET_POST_TITLE);
}

// ============================================================================
// Search and Pagination
// ============================================================================

#[tokio::test]
async fn test_search_posts_redacts_secret_matches() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    create_post(&app.server, &alice, "Rust tips", "borrowing", false).await;
    create_post(&app.server, &alice, "Rust diary", "secret notes", true).await;
    create_post(&app.server, &alice, "Cooking", "pasta", false).await;

    let response = app
        .server
        .get("/api/posts/search")
        .add_query_param("keyword", "Rust")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(posts[0]["title"], SECRET_POST_TITLE);
    assert_eq!(posts[1]["title"], "Rust tips");
}

#[tokio::test]
async fn test_search_blank_keyword_lists_all() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    create_post(&app.server, &alice, "One", "a", false).await;
    create_post(&app.server, &alice, "Two", "b", false).await;

    let response = app
        .server
        .get("/api/posts/search")
        .add_query_param("keyword", "  ")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["meta"]["total"], 2);
}

#[tokio::test]
async fn test_list_posts_pagination() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    for i in 1..=5 {
        create_post(&app.server, &alice, &format!("Post {i}"), "body", false).await;
    }

    let response = app
        .server
        .get("/api/posts")
        .add_query_param("page", 2)
        .add_query_param("per_page", 2)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["title"], "Post 3");
    assert_eq!(posts[1]["title"], "Post 2");
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["per_page"], 2);
    assert_eq!(body["meta"]["total"], 5);
}

// ============================================================================
// Update and Delete
// ============================================================================

#[tokio::test]
async fn test_update_post_by_owner() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let post_id = create_post(&app.server, &alice, "Draft", "v1", false).await;

    let response = app
        .server
        .put(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({
            "content": "v2",
            "secret": true
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Draft");
    assert_eq!(body["data"]["content"], "v2");
    assert_eq!(body["data"]["secret"], true);
}

#[tokio::test]
async fn test_update_post_by_other_user_forbidden() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let post_id = create_post(&app.server, &alice, "Draft", "v1", false).await;

    let response = app
        .server
        .put(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, bob.bearer())
        .json(&json!({ "title": "Mine now" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_update_any_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let admin = register_user(&app.server, "admin").await;
    let post_id = create_post(&app.server, &alice, "Draft", "v1", true).await;

    let response = app
        .server
        .put(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, admin.bearer())
        .json(&json!({ "title": "Moderated" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Moderated");
    assert_eq!(body["data"]["owner_id"], alice.id);
}

#[tokio::test]
async fn test_delete_post_removes_comments() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let post_id = create_post(&app.server, &alice, "Bye", "soon gone", false).await;
    common::create_comment(&app.server, &bob, post_id, "nice").await;

    let response = app
        .server
        .delete(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, bob.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .delete(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();

    let response = app.server.get(&format!("/api/posts/{}", post_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .get(&format!("/api/users/{}/comments", bob.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}
