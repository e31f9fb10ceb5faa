//! Admin handlers for Web API.
//!
//! Every handler here requires the admin role; the check happens in [`AdminService`].

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::admin::AdminService;
use crate::web::dto::{
    ApiResponse, PaginatedResponse, PaginationQuery, PostResponse, RenameUserRequest,
    ResetPasswordRequest, UserDetailResponse, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::post::paginated_posts;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

// ============================================================================
// User Management
// ============================================================================

/// GET /api/admin/users - List all users.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "List of all users", body = Vec<UserInfo>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    let users = AdminService::new(&state.db)
        .list_users(&auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(
        users.into_iter().map(Into::into).collect(),
    )))
}

/// PUT /api/admin/users/:id - Rename a user.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = RenameUserRequest,
    responses(
        (status = 200, description = "User renamed", body = UserInfo),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already in use"),
        (status = 422, description = "Invalid username")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_rename_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<RenameUserRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = AdminService::new(&state.db)
        .rename_user(&auth.principal(), user_id, &req.username)
        .await?;

    Ok(Json(ApiResponse::new(user.into())))
}

/// PUT /api/admin/users/:id/reset-password - Set a new password for a user.
#[utoipa::path(
    put,
    path = "/admin/users/{id}/reset-password",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found"),
        (status = 422, description = "Empty password")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_reset_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    AdminService::new(&state.db)
        .reset_password(&auth.principal(), user_id, &req.password)
        .await?;

    Ok(Json(ApiResponse::new(())))
}

/// GET /api/admin/users/:id/details - A user with all their posts and comments.
#[utoipa::path(
    get,
    path = "/admin/users/{id}/details",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_user_details(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    let detail = AdminService::new(&state.db)
        .user_details(&auth.principal(), user_id)
        .await?;

    Ok(Json(ApiResponse::new(detail.into())))
}

// ============================================================================
// Post Management
// ============================================================================

/// GET /api/admin/posts - List every post, secret ones included in full.
#[utoipa::path(
    get,
    path = "/admin/posts",
    tag = "admin",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of posts", body = Vec<PostResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_posts(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let result = AdminService::new(&state.db)
        .list_all_posts(&auth.principal(), pagination.to_pagination())
        .await?;

    Ok(Json(paginated_posts(result, &pagination)))
}

/// DELETE /api/admin/posts/:id - Delete any post with its comments and files.
#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Post not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_delete_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    AdminService::new(&state.db)
        .with_storage(state.file_storage.as_ref())
        .delete_post(&auth.principal(), post_id)
        .await?;

    Ok(Json(ApiResponse::new(())))
}
