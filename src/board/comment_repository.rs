//! Comment repository for finboard.

use super::comment::{Comment, NewComment};
use crate::datetime::now_db_string;
use crate::db::DbPool;
use crate::{FinboardError, Result};

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.owner_id, u.username AS author_name, \
     c.content, c.created_at, c.updated_at \
     FROM comments c JOIN users u ON u.id = c.owner_id";

/// Repository for comment operations.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new comment.
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let now = now_db_string();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (post_id, owner_id, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(new_comment.post_id)
        .bind(new_comment.owner_id)
        .bind(&new_comment.content)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("comment".to_string()))
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// List comments of a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// List comments written by a user, newest first.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Comment>> {
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.owner_id = $1 ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Count comments on a post.
    pub async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(count)
    }

    /// Replace a comment's content. Returns None if not found.
    pub async fn update_content(&self, id: i64, content: &str) -> Result<Option<Comment>> {
        let result =
            sqlx::query("UPDATE comments SET content = $1, updated_at = $2 WHERE id = $3")
                .bind(content)
                .bind(now_db_string())
                .bind(id)
                .execute(self.pool)
                .await
                .map_err(|e| FinboardError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a comment. Returns true if a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::board::{NewPost, PostRepository};
    use crate::db::{Database, NewUser, UserRepository};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "hash", "alice@example.com"))
            .await
            .unwrap();
        let post = PostRepository::new(db.pool())
            .create(&NewPost::new(user.id, "title", "content"))
            .await
            .unwrap();
        (db, user.id, post.id)
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (db, user_id, post_id) = setup().await;
        let repo = CommentRepository::new(db.pool());

        let first = repo
            .create(&NewComment::new(post_id, user_id, "first"))
            .await
            .unwrap();
        repo.create(&NewComment::new(post_id, user_id, "second"))
            .await
            .unwrap();

        assert_eq!(first.author_name, "alice");
        assert_eq!(first.post_id, post_id);

        let comments = repo.list_by_post(post_id).await.unwrap();
        let contents: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(repo.count_by_post(post_id).await.unwrap(), 2);

        let mine = repo.list_by_owner(user_id).await.unwrap();
        assert_eq!(mine[0].content, "second");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, user_id, post_id) = setup().await;
        let repo = CommentRepository::new(db.pool());

        let comment = repo
            .create(&NewComment::new(post_id, user_id, "before"))
            .await
            .unwrap();

        let updated = repo
            .update_content(comment.id, "after")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "after");
        assert!(repo.update_content(999, "x").await.unwrap().is_none());

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(!repo.delete(comment.id).await.unwrap());
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_requires_existing_post() {
        let (db, user_id, _) = setup().await;
        let repo = CommentRepository::new(db.pool());

        let result = repo.create(&NewComment::new(999, user_id, "orphan")).await;
        assert!(matches!(result, Err(FinboardError::Database(_))));
    }
}
