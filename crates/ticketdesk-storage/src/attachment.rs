//! Local filesystem attachment store.
//!
//! Every ticket gets its own folder (`uploads/{ticket_id}/`), and every
//! stored file gets a randomized unique prefix so that two uploads with
//! the same original name never collide.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use ticketdesk_core::error::{AppError, ErrorKind};
use ticketdesk_core::result::AppResult;

/// A stored attachment file.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Original filename, preserved for display.
    pub file_name: String,
    /// Path relative to the storage root, recorded on the attachment row.
    pub relative_path: String,
}

/// Filesystem-backed attachment store.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl AttachmentStore {
    /// Create a store rooted at the given path, creating it if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Store one attachment under the ticket's folder.
    ///
    /// Returns the original name plus the stored relative path.
    pub async fn save(&self, ticket_id: i64, original_name: &str, data: Bytes) -> AppResult<StoredFile> {
        let file_name = sanitize_file_name(original_name);
        let unique_name = format!("{}_{}", Uuid::new_v4(), file_name);
        let relative_path = format!("uploads/{ticket_id}/{unique_name}");

        let full_path = self.root.join(&relative_path);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write attachment: {relative_path}"),
                e,
            )
        })?;

        debug!(path = %relative_path, bytes = data.len(), "Stored attachment");

        Ok(StoredFile {
            file_name,
            relative_path,
        })
    }

    /// Read a stored attachment back.
    pub async fn read(&self, relative_path: &str) -> AppResult<Bytes> {
        let full_path = self.root.join(relative_path.trim_start_matches('/'));
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Attachment not found: {relative_path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read attachment: {relative_path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

/// Strip any path components from a client-supplied filename.
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    if base.is_empty() {
        "attachment".to_string()
    } else {
        base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\temp\\shot.png"), "shot.png");
        assert_eq!(sanitize_file_name("  "), "attachment");
    }

    #[tokio::test]
    async fn test_save_writes_under_ticket_folder_with_unique_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let stored = store
            .save(7, "screenshot.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        assert_eq!(stored.file_name, "screenshot.png");
        assert!(stored.relative_path.starts_with("uploads/7/"));
        assert!(stored.relative_path.ends_with("_screenshot.png"));

        let read_back = store.read(&stored.relative_path).await.unwrap();
        assert_eq!(read_back, Bytes::from_static(b"png-bytes"));
    }

    #[tokio::test]
    async fn test_same_name_twice_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let a = store.save(1, "log.txt", Bytes::from_static(b"a")).await.unwrap();
        let b = store.save(1, "log.txt", Bytes::from_static(b"b")).await.unwrap();

        assert_ne!(a.relative_path, b.relative_path);
        assert_eq!(store.read(&a.relative_path).await.unwrap(), Bytes::from_static(b"a"));
        assert_eq!(store.read(&b.relative_path).await.unwrap(), Bytes::from_static(b"b"));
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.read("uploads/9/nope.txt").await.unwrap_err();
        assert!(err.is_kind(ticketdesk_core::error::ErrorKind::NotFound));
    }
}
