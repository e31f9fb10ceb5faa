//! Post repository for finboard.
//!
//! Every query joins the owning user so that posts carry their author name.

use sqlx::QueryBuilder;

use super::post::{NewPost, Post, PostUpdate};
use crate::datetime::now_db_string;
use crate::db::{DbBackend, DbPool};
use crate::{FinboardError, Result};

const POST_SELECT: &str = "SELECT p.id, p.owner_id, u.username AS author_name, p.title, \
     p.content, p.secret, p.created_at, p.updated_at \
     FROM posts p JOIN users u ON u.id = p.owner_id";

const NEWEST_FIRST: &str = "ORDER BY p.created_at DESC, p.id DESC";

/// Escape `%`, `_` and `\` so a keyword is matched literally inside LIKE.
pub(crate) fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn title_pattern(keyword: &str) -> String {
    format!("%{}%", escape_like(keyword))
}

/// Repository for post CRUD operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post and return it with its assigned ID.
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let now = now_db_string();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (owner_id, title, content, secret, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(new_post.owner_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(new_post.secret)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Update a post by ID.
    ///
    /// Only fields set in the update are modified; `updated_at` is refreshed.
    /// Returns the updated post, or None if not found.
    pub async fn update(&self, id: i64, update: &PostUpdate) -> Result<Option<Post>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<DbBackend> = QueryBuilder::new("UPDATE posts SET ");
        let mut separated = query.separated(", ");

        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(ref content) = update.content {
            separated.push("content = ");
            separated.push_bind_unseparated(content);
        }
        if let Some(secret) = update.secret {
            separated.push("secret = ");
            separated.push_bind_unseparated(secret);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(now_db_string());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// List posts newest first with pagination.
    pub async fn list_paginated(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let sql = format!("{POST_SELECT} {NEWEST_FIRST} LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Count all posts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Search posts whose title contains `keyword`, ignoring case, newest first.
    ///
    /// `%` and `_` in the keyword are matched literally.
    pub async fn search_by_title(
        &self,
        keyword: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let sql = format!(
            "{POST_SELECT} WHERE LOWER(p.title) LIKE LOWER($1) ESCAPE '\\' \
             {NEWEST_FIRST} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(title_pattern(keyword))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Count posts matched by [`search_by_title`](Self::search_by_title).
    pub async fn count_by_title(&self, keyword: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE LOWER(title) LIKE LOWER($1) ESCAPE '\\'",
        )
        .bind(title_pattern(keyword))
        .fetch_one(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(count)
    }

    /// List every post of one owner, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.owner_id = $1 {NEWEST_FIRST}");
        sqlx::query_as::<_, Post>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Delete a post together with its comments and file records in one transaction.
    ///
    /// Returns the stored names of the removed files so the caller can delete
    /// their bytes after commit. Returns None if the post did not exist.
    pub async fn delete_cascade(&self, id: i64) -> Result<Option<Vec<String>>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        let stored_names: Vec<String> =
            sqlx::query_scalar("SELECT stored_name FROM files WHERE post_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| FinboardError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM files WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| FinboardError::Database(e.to_string()))?;
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(Some(stored_names))
    }
}
