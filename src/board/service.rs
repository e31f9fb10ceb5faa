//! Post service.
//!
//! High-level post operations with validation, permission checks and
//! pagination. Every read goes through the permission engine and the projector.

use tracing::{info, warn};

use crate::auth::{check_mutate, check_view, require_login, Principal};
use crate::db::Database;
use crate::file::FileStorage;
use crate::{FinboardError, Result};

use super::projection::{project_listing, PostView};
use super::repository::PostRepository;
use super::{NewPost, Post, PostUpdate};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum content length in characters.
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// Default page size for post listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Validate a post title.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(FinboardError::Validation("Title is required.".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(FinboardError::Validation(format!(
            "Title cannot be longer than {MAX_TITLE_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Validate post content.
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(FinboardError::Validation("Content is required.".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(FinboardError::Validation(format!(
            "Content cannot be longer than {MAX_CONTENT_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Number of items to skip.
    pub offset: i64,
    /// Maximum number of items to return.
    pub limit: i64,
}

impl Pagination {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// First page with the given size.
    pub fn first(limit: i64) -> Self {
        Self { offset: 0, limit }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// Result of a paginated query.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl<T> PaginatedResult<T> {
    /// Check if there are more items after this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }

    /// Pagination for the next page, or None on the last page.
    pub fn next_page(&self) -> Option<Pagination> {
        if self.has_more() {
            Some(Pagination::new(self.offset + self.limit, self.limit))
        } else {
            None
        }
    }
}

/// Service for post operations.
pub struct PostService<'a> {
    db: &'a Database,
    storage: Option<&'a FileStorage>,
}

impl<'a> PostService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, storage: None }
    }

    /// Attach file storage so that deleting a post also removes attachment bytes.
    pub fn with_storage(mut self, storage: Option<&'a FileStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Fetch a post or fail with NotFound.
    pub(crate) async fn fetch(&self, id: i64) -> Result<Post> {
        PostRepository::new(self.db.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))
    }

    /// Create a post owned by the principal.
    pub async fn create_post(
        &self,
        principal: &Principal,
        title: &str,
        content: &str,
        secret: bool,
    ) -> Result<PostView> {
        let owner_id = require_login(principal)?;
        validate_title(title)?;
        validate_content(content)?;

        let post = PostRepository::new(self.db.pool())
            .create(&NewPost::new(owner_id, title, content).with_secret(secret))
            .await?;

        info!(post_id = post.id, owner_id, secret, "Post created");
        Ok(PostView::from(&post))
    }

    /// Get a single post. Secret posts fail with AccessDenied unless readable.
    pub async fn get_post(&self, id: i64, principal: &Principal) -> Result<PostView> {
        let post = self.fetch(id).await?;
        check_view(&post, principal)?;
        Ok(PostView::from(&post))
    }

    /// List posts newest first. Unreadable secret posts come back redacted.
    pub async fn list_posts(
        &self,
        principal: &Principal,
        pagination: Pagination,
    ) -> Result<PaginatedResult<PostView>> {
        let repo = PostRepository::new(self.db.pool());
        let total = repo.count().await?;
        let posts = repo
            .list_paginated(pagination.offset, pagination.limit)
            .await?;

        Ok(PaginatedResult {
            items: project_listing(&posts, principal),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    /// Search posts by title. Same redaction rules as [`list_posts`](Self::list_posts).
    pub async fn search_posts(
        &self,
        keyword: &str,
        principal: &Principal,
        pagination: Pagination,
    ) -> Result<PaginatedResult<PostView>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return self.list_posts(principal, pagination).await;
        }

        let repo = PostRepository::new(self.db.pool());
        let total = repo.count_by_title(keyword).await?;
        let posts = repo
            .search_by_title(keyword, pagination.offset, pagination.limit)
            .await?;

        Ok(PaginatedResult {
            items: project_listing(&posts, principal),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    /// List all posts written by one user in listing context.
    pub async fn list_posts_by_user(
        &self,
        user_id: i64,
        principal: &Principal,
    ) -> Result<Vec<PostView>> {
        let posts = PostRepository::new(self.db.pool())
            .list_by_owner(user_id)
            .await?;
        Ok(project_listing(&posts, principal))
    }

    /// Update a post. Only the owner or an admin may do this.
    pub async fn update_post(
        &self,
        id: i64,
        principal: &Principal,
        update: &PostUpdate,
    ) -> Result<PostView> {
        let post = self.fetch(id).await?;
        check_mutate(post.owner_id, principal, "게시글을 수정할 권한이 없습니다.")?;

        if let Some(ref title) = update.title {
            validate_title(title)?;
        }
        if let Some(ref content) = update.content {
            validate_content(content)?;
        }

        let updated = PostRepository::new(self.db.pool())
            .update(id, update)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))?;

        info!(post_id = id, "Post updated");
        Ok(PostView::from(&updated))
    }

    /// Delete a post with its comments and attachments.
    pub async fn delete_post(&self, id: i64, principal: &Principal) -> Result<()> {
        let post = self.fetch(id).await?;
        check_mutate(post.owner_id, principal, "게시글을 삭제할 권한이 없습니다.")?;

        let stored_names = PostRepository::new(self.db.pool())
            .delete_cascade(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))?;

        if let Some(storage) = self.storage {
            for name in &stored_names {
                if let Err(e) = storage.delete(name).await {
                    warn!(stored_name = %name, error = %e, "Failed to remove attachment bytes");
                }
            }
        }

        info!(post_id = id, files = stored_names.len(), "Post deleted");
        Ok(())
    }
}
