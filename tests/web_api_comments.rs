#![cfg(feature = "sqlite")]

//! Web API Comment Tests
//!
//! Integration tests for comment endpoints and their dependence on the
//! parent post's visibility.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{create_comment, create_post, create_test_app, register_user};

#[tokio::test]
async fn test_create_and_list_comments() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;

    create_comment(&app.server, &bob, post_id, "first").await;
    create_comment(&app.server, &alice, post_id, "second").await;

    let response = app
        .server
        .get(&format!("/api/comments/post/{}", post_id))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "first");
    assert_eq!(comments[0]["author_name"], "bob");
    assert_eq!(comments[0]["post_id"], post_id);
    assert_eq!(comments[1]["content"], "second");
}

#[tokio::test]
async fn test_create_comment_requires_login() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;

    let response = app
        .server
        .post("/api/comments")
        .json(&json!({ "post_id": post_id, "content": "hi" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_comment_on_missing_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;

    let response = app
        .server
        .post("/api/comments")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "post_id": 42, "content": "hi" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_comment_rejected() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;

    let response = app
        .server
        .post("/api/comments")
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "post_id": post_id, "content": "   " }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Secret Parent Post
// ============================================================================

#[tokio::test]
async fn test_comments_of_secret_post_hidden_from_others() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let post_id = create_post(&app.server, &alice, "Diary", "private", true).await;
    create_comment(&app.server, &alice, post_id, "note to self").await;

    let response = app
        .server
        .get(&format!("/api/comments/post/{}", post_id))
        .add_header(AUTHORIZATION, bob.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get(&format!("/api/comments/post/{}", post_id))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get(&format!("/api/comments/post/{}", post_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_cannot_comment_on_unreadable_secret_post() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let admin = register_user(&app.server, "admin").await;
    let post_id = create_post(&app.server, &alice, "Diary", "private", true).await;

    let response = app
        .server
        .post("/api/comments")
        .add_header(AUTHORIZATION, bob.bearer())
        .json(&json!({ "post_id": post_id, "content": "peek" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    create_comment(&app.server, &admin, post_id, "moderator was here").await;
}

#[tokio::test]
async fn test_user_comments_filtered_by_post_visibility() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let bob = register_user(&app.server, "bob").await;
    let open_post = create_post(&app.server, &bob, "Open", "hello", false).await;
    let secret_post = create_post(&app.server, &alice, "Diary", "private", true).await;
    create_comment(&app.server, &alice, open_post, "public reply").await;
    create_comment(&app.server, &alice, secret_post, "private reply").await;

    let response = app
        .server
        .get(&format!("/api/users/{}/comments", alice.id))
        .add_header(AUTHORIZATION, bob.bearer())
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "public reply");

    let response = app
        .server
        .get(&format!("/api/users/{}/comments", alice.id))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Edit and Delete
// ============================================================================

#[tokio::test]
async fn test_update_comment_by_author_only() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let carol = register_user(&app.server, "carol").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;
    let comment_id = create_comment(&app.server, &carol, post_id, "typo").await;

    // The post's author may not edit someone else's comment
    let response = app
        .server
        .put(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "content": "rewritten" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, carol.bearer())
        .json(&json!({ "content": "fixed" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["content"], "fixed");
}

#[tokio::test]
async fn test_post_owner_can_delete_any_comment() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let carol = register_user(&app.server, "carol").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;
    let comment_id = create_comment(&app.server, &carol, post_id, "spam").await;

    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/comments/post/{}", post_id))
        .await;
    let body: Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unrelated_user_cannot_delete_comment() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let carol = register_user(&app.server, "carol").await;
    let dave = register_user(&app.server, "dave").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;
    let comment_id = create_comment(&app.server, &carol, post_id, "mine").await;

    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, dave.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Author and admin both succeed
    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, carol.bearer())
        .await;
    response.assert_status_ok();

    let admin = register_user(&app.server, "admin").await;
    let other_id = create_comment(&app.server, &carol, post_id, "again").await;
    let response = app
        .server
        .delete(&format!("/api/comments/{}", other_id))
        .add_header(AUTHORIZATION, admin.bearer())
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_delete_missing_comment() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;

    let response = app
        .server
        .delete("/api/comments/999")
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_frozen_after_post_made_secret() {
    let app = create_test_app().await;
    let alice = register_user(&app.server, "alice").await;
    let carol = register_user(&app.server, "carol").await;
    let post_id = create_post(&app.server, &alice, "Topic", "discuss", false).await;
    let comment_id = create_comment(&app.server, &carol, post_id, "early reply").await;

    let response = app
        .server
        .put(&format!("/api/posts/{}", post_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .json(&json!({ "secret": true }))
        .await;
    response.assert_status_ok();

    let response = app
        .server
        .put(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, carol.bearer())
        .json(&json!({ "content": "still here?" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, carol.bearer())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // The post's author can still clean it up
    let response = app
        .server
        .delete(&format!("/api/comments/{}", comment_id))
        .add_header(AUTHORIZATION, alice.bearer())
        .await;
    response.assert_status_ok();
}
