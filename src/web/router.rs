//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    admin_delete_post, admin_list_posts, admin_list_users, admin_rename_user,
    admin_reset_password, admin_user_details, create_comment, create_post, delete_comment,
    delete_file, delete_post, download_file, get_post, list_comments, list_post_files,
    list_posts, list_user_comments, login, logout, me, refresh, register, search_posts,
    update_comment, update_post, update_user, upload_file, AppState,
};
use super::middleware::{
    api_rate_limit, create_cors_layer, jwt_auth, login_rate_limit, JwtState, RateLimitState,
};

/// Room for multipart framing on top of the configured upload size.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    let login_limit_state = rate_limit.clone();
    let user_routes = Router::new()
        .route(
            "/login",
            post(login).layer(middleware::from_fn(move |req, next| {
                let state = login_limit_state.clone();
                login_rate_limit(state, req, next)
            })),
        )
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .route("/:id", put(update_user))
        .route("/:id/comments", get(list_user_comments));

    let post_routes = Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/search", get(search_posts))
        .route("/:id", get(get_post).put(update_post).delete(delete_post));

    let comment_routes = Router::new()
        .route("/", post(create_comment))
        .route("/post/:post_id", get(list_comments))
        .route("/:id", put(update_comment).delete(delete_comment));

    let upload_limit = (app_state.max_upload_size as usize).saturating_add(MULTIPART_OVERHEAD);
    let file_routes = Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/post/:post_id", get(list_post_files))
        .route("/:id", get(download_file).delete(delete_file));

    let admin_routes = Router::new()
        .route("/users", get(admin_list_users))
        .route("/users/:id", put(admin_rename_user))
        .route("/users/:id/reset-password", put(admin_reset_password))
        .route("/users/:id/details", get(admin_user_details))
        .route("/posts", get(admin_list_posts))
        .route("/posts/:id", delete(admin_delete_post));

    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/posts", post_routes)
        .nest("/comments", comment_routes)
        .nest("/files", file_routes)
        .nest("/admin", admin_routes);

    let jwt_state_for_middleware = jwt_state.clone();
    let api_limit_state = rate_limit.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = api_limit_state.clone();
                    api_rate_limit(state, req, next)
                }))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let response = create_health_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }
}
