//! Attachment byte storage.
//!
//! Files get a UUID-based stored name and live in a directory sharded by the
//! first two characters of that name:
//!
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.png
//! └── cd/
//!     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
//! ```
//!
//! Original names are never used on disk.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::{FinboardError, Result};

/// Location of freshly saved bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// UUID-based name, unique across the store.
    pub stored_name: String,
    /// Path relative to the storage root, `/`-separated.
    pub relative_path: String,
    pub size: i64,
}

/// Disk-backed attachment storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save bytes under a new stored name derived from the original name's extension.
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<StoredFile> {
        let stored_name = Self::generate_stored_name(original_name);
        let path = self.get_file_path(&stored_name)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;

        Ok(StoredFile {
            relative_path: Self::relative_path(&stored_name),
            stored_name,
            size: content.len() as i64,
        })
    }

    /// Read the bytes of a stored file.
    pub async fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let path = self.get_file_path(stored_name)?;

        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FinboardError::NotFound(format!("file content {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file. Returns false if it was already gone.
    pub async fn delete(&self, stored_name: &str) -> Result<bool> {
        let path = self.get_file_path(stored_name)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.get_file_path(stored_name) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Absolute path of a stored name: `{base}/{shard}/{stored_name}`.
    ///
    /// Names containing path separators or `..` are rejected.
    pub fn get_file_path(&self, stored_name: &str) -> Result<PathBuf> {
        Self::check_stored_name(stored_name)?;
        Ok(self
            .base_path
            .join(Self::shard(stored_name))
            .join(stored_name))
    }

    /// Path of a stored name relative to the storage root.
    pub fn relative_path(stored_name: &str) -> String {
        format!("{}/{}", Self::shard(stored_name), stored_name)
    }

    /// Generate a UUID-based stored name keeping the original extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use finboard::file::FileStorage;
    ///
    /// assert!(FileStorage::generate_stored_name("report.pdf").ends_with(".pdf"));
    /// assert!(FileStorage::generate_stored_name("README").ends_with(".bin"));
    /// ```
    pub fn generate_stored_name(original_name: &str) -> String {
        format!("{}.{}", Uuid::new_v4(), Self::extension(original_name))
    }

    fn shard(stored_name: &str) -> &str {
        stored_name.get(..2).unwrap_or(stored_name)
    }

    /// Lowercase ASCII extension of a name, or "bin".
    fn extension(name: &str) -> String {
        Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "bin".to_string())
    }

    fn check_stored_name(stored_name: &str) -> Result<()> {
        if stored_name.is_empty()
            || stored_name.contains("..")
            || stored_name.contains('/')
            || stored_name.contains('\\')
        {
            return Err(FinboardError::Validation(format!(
                "invalid stored file name: {stored_name}"
            )));
        }
        Ok(())
    }
}
