//! Filesystem record store.
//!
//! # Security
//!
//! - **Path traversal**: keys are validated with [`RecordKey::is_safe`] and
//!   the resulting path must stay under the records directory
//! - **File size limits**: records larger than [`MAX_RECORD_SIZE`] are
//!   refused on read

use super::{RecordKey, RecordStore};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum size of a record file (256 KiB).
pub const MAX_RECORD_SIZE: u64 = 256 * 1024;

/// Stores each record as `<key>.txt` under one directory.
#[derive(Debug, Clone)]
pub struct FilesystemRecordStore {
    base_path: PathBuf,
}

impl FilesystemRecordStore {
    /// Creates a store rooted at `base_path`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Creates a store and its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| Error::OperationFailed {
            operation: "create_records_dir".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self { base_path })
    }

    /// Returns the base path.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the record for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the key is not a safe file stem.
    pub fn record_path(&self, key: &RecordKey) -> Result<PathBuf> {
        if !key.is_safe() {
            return Err(Error::InvalidInput(format!(
                "record key contains invalid characters: {key}"
            )));
        }

        let path = self.base_path.join(key.file_name());
        if !path.starts_with(&self.base_path) {
            return Err(Error::InvalidInput(format!(
                "path traversal attempt detected for record key: {key}"
            )));
        }
        Ok(path)
    }
}

impl RecordStore for FilesystemRecordStore {
    fn read(&self, key: &RecordKey) -> Result<Option<String>> {
        let path = self.record_path(key)?;
        if !path.exists() {
            debug!(path = %path.display(), "no record");
            return Ok(None);
        }

        let metadata = fs::metadata(&path).map_err(|e| Error::OperationFailed {
            operation: "read_record_metadata".to_string(),
            cause: e.to_string(),
        })?;
        if metadata.len() > MAX_RECORD_SIZE {
            return Err(Error::InvalidInput(format!(
                "record exceeds maximum size of {MAX_RECORD_SIZE} bytes: {}",
                path.display()
            )));
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| Error::OperationFailed {
                operation: "read_record".to_string(),
                cause: e.to_string(),
            })
    }

    fn write(&self, key: &RecordKey, text: &str) -> Result<()> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.base_path).map_err(|e| Error::OperationFailed {
            operation: "create_records_dir".to_string(),
            cause: e.to_string(),
        })?;
        fs::write(&path, text).map_err(|e| Error::OperationFailed {
            operation: "write_record".to_string(),
            cause: e.to_string(),
        })?;
        debug!(path = %path.display(), bytes = text.len(), "wrote record");
        Ok(())
    }

    fn exists(&self, key: &RecordKey) -> Result<bool> {
        Ok(self.record_path(key)?.exists())
    }
}
