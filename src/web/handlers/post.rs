//! Post handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::board::{PaginatedResult, PostService, PostUpdate, PostView};
use crate::web::dto::{
    ApiResponse, CreatePostRequest, PaginatedResponse, PaginationQuery, PostResponse,
    SearchQuery, UpdatePostRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

pub(crate) fn paginated_posts(
    result: PaginatedResult<PostView>,
    pagination: &PaginationQuery,
) -> PaginatedResponse<PostResponse> {
    let (page, per_page) = pagination.normalized();
    PaginatedResponse::new(
        result.items.into_iter().map(Into::into).collect(),
        page,
        per_page,
        result.total.max(0) as u64,
    )
}

/// POST /api/posts - Create a post.
#[utoipa::path(
    post,
    path = "/posts",
    tag = "posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid title or content")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let post = PostService::new(&state.db)
        .create_post(&auth.principal(), req.title.trim(), &req.content, req.secret)
        .await?;

    Ok(Json(ApiResponse::new(post.into())))
}

/// GET /api/posts - List posts, newest first.
///
/// Secret posts the caller cannot read are included with a placeholder title and
/// empty content.
#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of posts", body = Vec<PostResponse>)
    )
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let result = PostService::new(&state.db)
        .list_posts(&auth.principal(), pagination.to_pagination())
        .await?;

    Ok(Json(paginated_posts(result, &pagination)))
}

/// GET /api/posts/search - Search posts by title.
#[utoipa::path(
    get,
    path = "/posts/search",
    tag = "posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Page of matching posts", body = Vec<PostResponse>)
    )
)]
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let pagination = query.pagination();
    let result = PostService::new(&state.db)
        .search_posts(&query.keyword, &auth.principal(), pagination.to_pagination())
        .await?;

    Ok(Json(paginated_posts(result, &pagination)))
}

/// GET /api/posts/:id - Get a single post.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 403, description = "Secret post of another user"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let post = PostService::new(&state.db)
        .get_post(post_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(post.into())))
}

/// PUT /api/posts/:id - Update a post (owner or admin).
#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
        (status = 422, description = "Invalid title or content")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let mut update = PostUpdate::new();
    if let Some(title) = req.title {
        update = update.title(title.trim());
    }
    if let Some(content) = req.content {
        update = update.content(content);
    }
    if let Some(secret) = req.secret {
        update = update.secret(secret);
    }

    let post = PostService::new(&state.db)
        .update_post(post_id, &auth.principal(), &update)
        .await?;

    Ok(Json(ApiResponse::new(post.into())))
}

/// DELETE /api/posts/:id - Delete a post with its comments and files.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    PostService::new(&state.db)
        .with_storage(state.file_storage.as_ref())
        .delete_post(post_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(())))
}
