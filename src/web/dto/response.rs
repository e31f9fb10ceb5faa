//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::admin::UserDetail;
use crate::board::{CommentView, PostView};
use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::file::FileRecord;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Account DTOs
// ============================================================================

/// Login and registration response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    pub user: UserInfo,
}

/// User information in responses. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// "user" or "admin".
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.as_str().to_string(),
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Token refresh response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry in seconds.
    pub expires_in: u64,
}

// ============================================================================
// Board DTOs
// ============================================================================

/// Post response. Redacted secret posts carry the placeholder title and an empty body.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub owner_id: i64,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub secret: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        Self {
            id: view.id,
            owner_id: view.owner_id,
            author_name: view.author_name,
            title: view.title,
            content: view.content,
            secret: view.secret,
            created_at: to_rfc3339(&view.created_at),
            updated_at: to_rfc3339(&view.updated_at),
        }
    }
}

/// Comment response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.id,
            post_id: view.post_id,
            owner_id: view.owner_id,
            author_name: view.author_name,
            content: view.content,
            created_at: to_rfc3339(&view.created_at),
            updated_at: to_rfc3339(&view.updated_at),
        }
    }
}

// ============================================================================
// File DTOs
// ============================================================================

/// File metadata response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub uploader_id: i64,
    pub original_name: String,
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    pub uploaded_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            post_id: record.post_id,
            uploader_id: record.uploader_id,
            original_name: record.original_name,
            content_type: record.content_type,
            size: record.size,
            uploaded_at: to_rfc3339(&record.uploaded_at),
        }
    }
}

// ============================================================================
// Admin DTOs
// ============================================================================

/// A user with their posts and comments.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailResponse {
    pub user: UserInfo,
    pub posts: Vec<PostResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<UserDetail> for UserDetailResponse {
    fn from(detail: UserDetail) -> Self {
        Self {
            user: detail.user.into(),
            posts: detail.posts.into_iter().map(Into::into).collect(),
            comments: detail.comments.into_iter().map(Into::into).collect(),
        }
    }
}
