//! Test helpers for Web API integration tests.
//!
//! Provides an in-process server over an in-memory database plus helpers for
//! registering users and creating content.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use finboard::file::FileStorage;
use finboard::web::handlers::AppState;
use finboard::web::middleware::{JwtState, RateLimitState};
use finboard::web::router::create_router;
use finboard::Database;

pub const JWT_SECRET: &str = "test-secret-key-for-testing-only";
pub const PASSWORD: &str = "password123";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    _files: TempDir,
}

/// A registered user and their tokens.
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    /// Value for the Authorization header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Create a test server with an in-memory database and temporary file storage.
pub async fn create_test_app() -> TestApp {
    let files = TempDir::new().expect("Failed to create temp dir");
    let storage = FileStorage::new(files.path().join("files")).expect("Failed to create storage");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let shared_db = Arc::new(db);

    let app_state =
        Arc::new(AppState::new(shared_db.clone(), JWT_SECRET, 900, 7).with_file_storage(storage, 1));
    let jwt_state = Arc::new(JwtState::new(JWT_SECRET));
    let rate_limit = Arc::new(RateLimitState::new(1000, 10000));

    let router = create_router(app_state, jwt_state, rate_limit, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db: shared_db,
        _files: files,
    }
}

/// Register a user and return their ID and tokens.
pub async fn register_user(server: &TestServer, username: &str) -> TestUser {
    let response = server
        .post("/api/users/register")
        .json(&json!({
            "username": username,
            "password": PASSWORD,
            "email": format!("{username}@example.com"),
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    TestUser {
        id: body["data"]["user"]["id"].as_i64().expect("user id"),
        username: username.to_string(),
        access_token: body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string(),
        refresh_token: body["data"]["refresh_token"]
            .as_str()
            .expect("refresh token")
            .to_string(),
    }
}

/// Create a post as `user` and return its ID.
pub async fn create_post(
    server: &TestServer,
    user: &TestUser,
    title: &str,
    content: &str,
    secret: bool,
) -> i64 {
    let response = server
        .post("/api/posts")
        .add_header(axum::http::header::AUTHORIZATION, user.bearer())
        .json(&json!({
            "title": title,
            "content": content,
            "secret": secret,
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("post id")
}

/// Add a comment as `user` and return its ID.
pub async fn create_comment(server: &TestServer, user: &TestUser, post_id: i64, content: &str) -> i64 {
    let response = server
        .post("/api/comments")
        .add_header(axum::http::header::AUTHORIZATION, user.bearer())
        .json(&json!({
            "post_id": post_id,
            "content": content,
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("comment id")
}
