//! Comment handlers for Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::board::CommentService;
use crate::web::dto::{
    ApiResponse, CommentResponse, CreateCommentRequest, UpdateCommentRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// POST /api/comments - Comment on a post.
#[utoipa::path(
    post,
    path = "/comments",
    tag = "comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Secret post of another user"),
        (status = 404, description = "Post not found"),
        (status = 422, description = "Empty or too long content")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentResponse>>, ApiError> {
    let comment = CommentService::new(&state.db)
        .create_comment(&auth.principal(), req.post_id, &req.content)
        .await?;

    Ok(Json(ApiResponse::new(comment.into())))
}

/// GET /api/comments/post/:post_id - Comments of a post, oldest first.
#[utoipa::path(
    get,
    path = "/comments/post/{post_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 403, description = "Secret post of another user"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentResponse>>>, ApiError> {
    let comments = CommentService::new(&state.db)
        .list_comments(post_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(
        comments.into_iter().map(Into::into).collect(),
    )))
}

/// PUT /api/comments/:id - Edit a comment (author or admin).
#[utoipa::path(
    put,
    path = "/comments/{id}",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<i64>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<ApiResponse<CommentResponse>>, ApiError> {
    let comment = CommentService::new(&state.db)
        .update_comment(comment_id, &auth.principal(), &req.content)
        .await?;

    Ok(Json(ApiResponse::new(comment.into())))
}

/// DELETE /api/comments/:id - Delete a comment.
///
/// Allowed for the comment's author, the post's author and admins.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not allowed to delete"),
        (status = 404, description = "Comment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    CommentService::new(&state.db)
        .delete_comment(comment_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(())))
}
