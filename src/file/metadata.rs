//! Attachment records and their repository.

use crate::datetime::now_db_string;
use crate::db::DbPool;
use crate::{FinboardError, Result};

const FILE_COLUMNS: &str = "id, post_id, uploader_id, original_name, stored_name, path, \
     content_type, size, uploaded_at";

/// Metadata row for an uploaded file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    pub id: i64,
    /// Parent post, or None for an upload not attached to any post.
    pub post_id: Option<i64>,
    pub uploader_id: i64,
    /// Name the uploader gave the file. Only used for display and downloads.
    pub original_name: String,
    /// UUID-based name on disk.
    pub stored_name: String,
    /// Path relative to the storage root.
    pub path: String,
    pub content_type: String,
    pub size: i64,
    pub uploaded_at: String,
}

/// Data for creating a file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub post_id: Option<i64>,
    pub uploader_id: i64,
    pub original_name: String,
    pub stored_name: String,
    pub path: String,
    pub content_type: String,
    pub size: i64,
}

impl NewFileRecord {
    pub fn new(
        uploader_id: i64,
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        path: impl Into<String>,
        size: i64,
    ) -> Self {
        Self {
            post_id: None,
            uploader_id,
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            path: path.into(),
            content_type: "application/octet-stream".to_string(),
            size,
        }
    }

    /// Attach the file to a post.
    pub fn with_post(mut self, post_id: Option<i64>) -> Self {
        self.post_id = post_id;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Repository for file records.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, file: &NewFileRecord) -> Result<FileRecord> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO files (post_id, uploader_id, original_name, stored_name, path,
                                content_type, size, uploaded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(file.post_id)
        .bind(file.uploader_id)
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(&file.path)
        .bind(&file.content_type)
        .bind(file.size)
        .bind(now_db_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("file".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, FileRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// List the files attached to a post in upload order.
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<FileRecord>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE post_id = $1 ORDER BY id");
        sqlx::query_as::<_, FileRecord>(&sql)
            .bind(post_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Delete a file record. Returns true if a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
