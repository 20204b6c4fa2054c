//! Filesystem-based snapshot backend.
//!
//! Stores each key as a single JSON file, `<base_path>/<key>.json`.
//!
//! # Security
//!
//! - **Path traversal**: keys are validated so they cannot escape the base directory
//! - **File size limits**: oversized snapshots are rejected before reading
//!
//! Writes go to a temporary sibling file which is then renamed over the
//! target, so a crash mid-write leaves the previous snapshot intact.

use crate::storage::traits::SnapshotBackend;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum snapshot file size (16MB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Filesystem-based snapshot backend.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    /// Base directory for storage.
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Creates a new filesystem backend.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a new filesystem backend with checked directory creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_create(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).map_err(|e| Error::OperationFailed {
            operation: "create_storage_dir".to_string(),
            cause: format!("{}: {e}", base_path.display()),
        })?;

        Ok(Self { base_path })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the file path for a key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the key contains anything other than
    /// alphanumerics, dashes and underscores.
    pub fn snapshot_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::is_safe_key(key) {
            return Err(Error::InvalidInput(format!(
                "storage key contains invalid characters: {key}"
            )));
        }

        Ok(self.base_path.join(format!("{key}.json")))
    }

    /// Checks if a key is safe to use as a file stem.
    fn is_safe_key(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= 255
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl SnapshotBackend for FilesystemBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.snapshot_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let metadata = fs::metadata(&path).map_err(|e| Error::OperationFailed {
            operation: "read_file_metadata".to_string(),
            cause: e.to_string(),
        })?;

        if metadata.len() > MAX_FILE_SIZE {
            return Err(Error::OperationFailed {
                operation: "read_snapshot".to_string(),
                cause: format!(
                    "snapshot exceeds maximum size of {MAX_FILE_SIZE} bytes: {}",
                    path.display()
                ),
            });
        }

        let payload = fs::read_to_string(&path).map_err(|e| Error::OperationFailed {
            operation: "read_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Some(payload))
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<()> {
        let path = self.snapshot_path(key)?;

        fs::create_dir_all(&self.base_path).map_err(|e| Error::OperationFailed {
            operation: "create_storage_dir".to_string(),
            cause: e.to_string(),
        })?;

        let tmp_path = self.base_path.join(format!(".{key}.json.tmp"));
        fs::write(&tmp_path, payload).map_err(|e| Error::OperationFailed {
            operation: "write_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            Error::OperationFailed {
                operation: "replace_snapshot".to_string(),
                cause: e.to_string(),
            }
        })?;

        tracing::debug!(path = %path.display(), bytes = payload.len(), "Wrote snapshot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let path = self.snapshot_path(key)?;

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| Error::OperationFailed {
            operation: "remove_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        Ok(true)
    }
}
