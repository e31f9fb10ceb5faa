//! File service.
//!
//! Attachments inherit reachability from their parent post: reading needs a
//! direct read of the post, uploading and deleting need owner-or-admin on it.

use tracing::{info, warn};

use crate::auth::{can_mutate, check_mutate, check_view, require_login, Principal};
use crate::board::{Post, PostRepository};
use crate::db::Database;
use crate::{FinboardError, Result};

use super::metadata::{FileRecord, FileRepository, NewFileRecord};
use super::storage::FileStorage;
use super::{DEFAULT_MAX_FILE_SIZE, MAX_FILENAME_LENGTH};

/// Request data for an upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Post to attach to, or None for a standalone upload.
    pub post_id: Option<i64>,
    pub original_name: String,
    /// Declared content type. Guessed from the name when absent.
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl UploadRequest {
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            post_id: None,
            original_name: original_name.into(),
            content_type: None,
            content,
        }
    }

    pub fn with_post(mut self, post_id: Option<i64>) -> Self {
        self.post_id = post_id;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }
}

/// Result of a download.
#[derive(Debug)]
pub struct DownloadResult {
    pub record: FileRecord,
    pub content: Vec<u8>,
}

/// Reject empty names and names that try to walk out of a directory.
pub fn validate_original_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FinboardError::Validation("파일 이름이 비어 있습니다.".to_string()));
    }
    if name.contains("..") {
        return Err(FinboardError::Validation(format!(
            "파일 이름에 잘못된 경로가 포함되어 있습니다: {name}"
        )));
    }
    if name.chars().count() > MAX_FILENAME_LENGTH {
        return Err(FinboardError::Validation(format!(
            "파일 이름은 {MAX_FILENAME_LENGTH}자 이하여야 합니다."
        )));
    }
    Ok(())
}

/// Service for attachment operations.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a FileStorage,
    max_file_size: u64,
}

impl<'a> FileService<'a> {
    pub fn new(db: &'a Database, storage: &'a FileStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    async fn fetch_post(&self, post_id: i64) -> Result<Post> {
        PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))
    }

    async fn fetch_record(&self, id: i64) -> Result<FileRecord> {
        FileRepository::new(self.db.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("file".to_string()))
    }

    /// Check that the principal may read a file's content.
    ///
    /// Attached files follow the parent post. Standalone uploads are visible to
    /// their uploader and admins.
    async fn check_readable(&self, record: &FileRecord, principal: &Principal) -> Result<()> {
        match record.post_id {
            Some(post_id) => {
                let post = self.fetch_post(post_id).await?;
                check_view(&post, principal)
            }
            None => check_mutate(
                record.uploader_id,
                principal,
                "파일에 접근할 권한이 없습니다.",
            ),
        }
    }

    /// Store an upload and record it.
    ///
    /// Bytes are written first; if the record cannot be created they are removed.
    pub async fn upload(&self, principal: &Principal, request: &UploadRequest) -> Result<FileRecord> {
        let uploader_id = require_login(principal)?;
        validate_original_name(&request.original_name)?;

        if request.content.len() as u64 > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(FinboardError::Validation(format!(
                "파일 크기가 너무 큽니다. (최대 {max_mb}MB)"
            )));
        }

        if let Some(post_id) = request.post_id {
            let post = self.fetch_post(post_id).await?;
            check_mutate(post.owner_id, principal, "파일을 업로드할 권한이 없습니다.")?;
        }

        let content_type = request.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&request.original_name)
                .first_or_octet_stream()
                .to_string()
        });

        let stored = self
            .storage
            .save(&request.content, &request.original_name)
            .await?;

        let new_record = NewFileRecord::new(
            uploader_id,
            &request.original_name,
            &stored.stored_name,
            &stored.relative_path,
            stored.size,
        )
        .with_post(request.post_id)
        .with_content_type(content_type);

        let record = match FileRepository::new(self.db.pool()).create(&new_record).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.stored_name).await {
                    warn!(
                        stored_name = %stored.stored_name,
                        error = %cleanup,
                        "Failed to remove bytes of unrecorded upload"
                    );
                }
                return Err(e);
            }
        };

        info!(
            file_id = record.id,
            post_id = ?record.post_id,
            uploader_id,
            size = record.size,
            "File uploaded"
        );
        Ok(record)
    }

    /// Metadata of a single file.
    pub async fn get_file(&self, id: i64, principal: &Principal) -> Result<FileRecord> {
        let record = self.fetch_record(id).await?;
        self.check_readable(&record, principal).await?;
        Ok(record)
    }

    /// Metadata and bytes of a single file.
    pub async fn download(&self, id: i64, principal: &Principal) -> Result<DownloadResult> {
        let record = self.get_file(id, principal).await?;
        let content = self.storage.load(&record.stored_name).await?;
        Ok(DownloadResult { record, content })
    }

    /// Files attached to a post.
    pub async fn list_by_post(&self, post_id: i64, principal: &Principal) -> Result<Vec<FileRecord>> {
        let post = self.fetch_post(post_id).await?;
        check_view(&post, principal)?;
        FileRepository::new(self.db.pool()).list_by_post(post_id).await
    }

    /// Delete a file record and its bytes.
    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<()> {
        require_login(principal)?;
        let record = self.fetch_record(id).await?;

        let allowed = match record.post_id {
            Some(post_id) => {
                let post = self.fetch_post(post_id).await?;
                can_mutate(post.owner_id, principal)
            }
            None => principal.is_admin,
        };
        if !allowed {
            return Err(FinboardError::AccessDenied(
                "파일을 삭제할 권한이 없습니다.".to_string(),
            ));
        }

        FileRepository::new(self.db.pool()).delete(id).await?;
        if let Err(e) = self.storage.delete(&record.stored_name).await {
            warn!(file_id = id, error = %e, "Failed to remove file bytes");
        }

        info!(file_id = id, "File deleted");
        Ok(())
    }
}
