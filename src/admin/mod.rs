//! Administration for finboard.
//!
//! Every operation starts with an admin check on the acting principal:
//! - List users and all posts
//! - Delete any post (with its comments and attachments)
//! - Rename a user or reset their password
//! - Inspect a user together with their posts and comments

use tracing::info;

use crate::auth::registration::ensure_username_available;
use crate::auth::validation::validate_updated_username;
use crate::auth::{hash_password, require_admin, AccountError, Principal};
use crate::board::{
    CommentService, CommentView, PaginatedResult, Pagination, PostService, PostView,
};
use crate::db::{Database, User, UserRepository, UserUpdate};
use crate::file::FileStorage;
use crate::{FinboardError, Result};

/// A user with everything they have written.
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub user: User,
    pub posts: Vec<PostView>,
    pub comments: Vec<CommentView>,
}

/// Service for administrative operations.
pub struct AdminService<'a> {
    db: &'a Database,
    storage: Option<&'a FileStorage>,
}

impl<'a> AdminService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, storage: None }
    }

    /// Attach file storage so that post deletion also removes attachment bytes.
    pub fn with_storage(mut self, storage: Option<&'a FileStorage>) -> Self {
        self.storage = storage;
        self
    }

    async fn fetch_user(&self, id: i64) -> Result<User> {
        UserRepository::new(self.db.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("user".to_string()))
    }

    /// List every user ordered by ID.
    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>> {
        require_admin(principal)?;
        UserRepository::new(self.db.pool()).list_all().await
    }

    /// List every post. The admin bypass means nothing is redacted.
    pub async fn list_all_posts(
        &self,
        principal: &Principal,
        pagination: Pagination,
    ) -> Result<PaginatedResult<PostView>> {
        require_admin(principal)?;
        PostService::new(self.db)
            .list_posts(principal, pagination)
            .await
    }

    /// Delete any post with its comments and attachments.
    pub async fn delete_post(&self, principal: &Principal, post_id: i64) -> Result<()> {
        let admin_id = require_admin(principal)?;
        PostService::new(self.db)
            .with_storage(self.storage)
            .delete_post(post_id, principal)
            .await?;
        info!(admin_id, post_id, "Post deleted by admin");
        Ok(())
    }

    /// Rename a user. Blank or unchanged names leave the user as is.
    pub async fn rename_user(
        &self,
        principal: &Principal,
        user_id: i64,
        username: &str,
    ) -> Result<User> {
        let admin_id = require_admin(principal)?;
        let user = self.fetch_user(user_id).await?;

        let username = username.trim();
        if username.is_empty() || username == user.username {
            return Ok(user);
        }

        validate_updated_username(username).map_err(AccountError::from)?;
        let repo = UserRepository::new(self.db.pool());
        ensure_username_available(&repo, &user.username, username).await?;

        let updated = repo
            .update(user_id, &UserUpdate::new().username(username))
            .await?
            .ok_or_else(|| FinboardError::NotFound("user".to_string()))?;

        info!(admin_id, user_id, username = %updated.username, "User renamed by admin");
        Ok(updated)
    }

    /// Set a new password for a user.
    pub async fn reset_password(
        &self,
        principal: &Principal,
        user_id: i64,
        new_password: &str,
    ) -> Result<()> {
        let admin_id = require_admin(principal)?;

        let new_password = new_password.trim();
        if new_password.is_empty() {
            return Err(FinboardError::Validation(
                "새 비밀번호는 비어 있을 수 없습니다.".to_string(),
            ));
        }
        let user = self.fetch_user(user_id).await?;

        let hash = hash_password(new_password).map_err(AccountError::from)?;
        UserRepository::new(self.db.pool())
            .update(user.id, &UserUpdate::new().password(hash))
            .await?;

        info!(admin_id, user_id, "Password reset by admin");
        Ok(())
    }

    /// A user with all of their posts and comments, unredacted.
    pub async fn user_details(&self, principal: &Principal, user_id: i64) -> Result<UserDetail> {
        require_admin(principal)?;
        let user = self.fetch_user(user_id).await?;

        let posts = PostService::new(self.db)
            .list_posts_by_user(user_id, principal)
            .await?;
        let comments = CommentService::new(self.db)
            .list_comments_by_user(user_id, principal)
            .await?;

        Ok(UserDetail {
            user,
            posts,
            comments,
        })
    }
}
