//! Attachment handling for finboard.
//!
//! - Byte storage with UUID naming and sharded directories
//! - File records linked to posts
//! - A service that gates every operation on the parent post

mod metadata;
mod service;
mod storage;

pub use metadata::{FileRecord, FileRepository, NewFileRecord};
pub use service::{validate_original_name, DownloadResult, FileService, UploadRequest};
pub use storage::{FileStorage, StoredFile};

/// Maximum length for an original filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
