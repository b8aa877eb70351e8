//! Local-filesystem store for uploaded documents.
//!
//! Uploads are written under a configured root with generated names; the
//! database keeps the metadata (see `domari_db::models::document`). A read
//! of a file that has not become visible yet surfaces as
//! [`StorageError::NotFound`], which document attachment treats as
//! retryable.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The stored file does not exist (yet).
    #[error("Stored file not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether a retry may succeed. Only the not-yet-visible case qualifies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Filesystem-backed document storage rooted at one directory.
#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Write an upload, returning the generated storage-relative path.
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(filename));
        tokio::fs::write(self.root.join(&stored_name), data).await?;
        Ok(stored_name)
    }

    /// Read a previously stored file by its storage-relative path.
    pub async fn read(&self, stored_path: &str) -> Result<Vec<u8>, StorageError> {
        match tokio::fs::read(self.root.join(stored_path)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(stored_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check that a stored file exists and is readable.
    pub async fn verify(&self, stored_path: &str) -> Result<(), StorageError> {
        match tokio::fs::metadata(self.root.join(stored_path)).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(stored_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Strip path separators and control characters from a client filename.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("invoice-2024_03.pdf"), "invoice-2024_03.pdf");
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn sanitize_empty_becomes_placeholder() {
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn not_found_is_retryable() {
        assert!(StorageError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn io_error_is_not_retryable() {
        let err = StorageError::Io(std::io::Error::other("disk on fire"));
        assert!(!err.is_retryable());
    }
}
