//! Filesystem-backed object storage.
//!
//! Objects are stored as plain files under a root directory, one file per key:
//! `{root}/{key}`. Writes go to a staging file first and are then linked into
//! place, which fails if the key is already taken, so concurrent uploads never
//! overwrite each other.

use crate::{ObjectInfo, ObjectStorage, UploadReceipt, validate_key};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use vitrine_core::PublicUrlBase;
use vitrine_error::{StorageError, StorageErrorKind};

const STAGING_DIR: &str = ".staging";

/// Filesystem storage backend.
///
/// # Example Structure
///
/// ```text
/// ./vitrine-storage/
/// ├── .staging/                       (in-flight writes)
/// ├── project-banner-1700000000000-k3j9x0a1b2c3.jpg
/// └── temp/
///     └── news-content-1700000000000-p0o9i8u7y6t5.png
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
    public_base: PublicUrlBase,
}

impl FileSystemStorage {
    /// Create a filesystem backend, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Result<Self, StorageError> {
        let root = root.into();

        std::fs::create_dir_all(root.join(STAGING_DIR)).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        let public_base = PublicUrlBase::new(format!("file://{}", root.display()), bucket);
        tracing::info!(path = %root.display(), "Created filesystem storage");
        Ok(Self { root, public_base })
    }

    /// Serve public URLs from a different base.
    pub fn with_public_base(mut self, public_base: PublicUrlBase) -> Self {
        self.public_base = public_base;
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
    }

    async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        Ok(())
    }

    fn io_error(key: &str, action: &str, e: std::io::Error) -> StorageError {
        match e.kind() {
            std::io::ErrorKind::NotFound => {
                StorageError::new(StorageErrorKind::NotFound(key.to_string()))
            }
            std::io::ErrorKind::AlreadyExists => {
                StorageError::new(StorageErrorKind::Conflict(key.to_string()))
            }
            std::io::ErrorKind::PermissionDenied => {
                StorageError::new(StorageErrorKind::PermissionDenied(format!("{}: {}", key, e)))
            }
            _ if action == "read" => {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", key, e)))
            }
            _ => StorageError::new(StorageErrorKind::FileWrite(format!(
                "{} {}: {}",
                action, key, e
            ))),
        }
    }

    /// Read an object's bytes.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored at the key.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::io_error(key, "read", e))
    }

    fn walk(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir).map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
            })?;

            for entry in entries.flatten() {
                let path = entry.path();
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");

                if key == STAGING_DIR {
                    continue;
                }

                let Ok(metadata) = entry.metadata() else {
                    continue;
                };
                if metadata.is_dir() {
                    pending.push(path);
                } else if key.starts_with(prefix) {
                    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
                    found.push(ObjectInfo::new(key, Some(metadata.len()), modified));
                }
            }
        }

        found.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(found)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for FileSystemStorage {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    fn public_base(&self) -> &PublicUrlBase {
        &self.public_base
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<UploadReceipt, StorageError> {
        let path = self.object_path(key)?;
        Self::ensure_parent(&path).await?;

        let staging = self
            .root
            .join(STAGING_DIR)
            .join(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&staging, bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                staging.display(),
                e
            )))
        })?;

        // Linking refuses an existing target, unlike rename.
        let linked = tokio::fs::hard_link(&staging, &path).await;
        let _ = tokio::fs::remove_file(&staging).await;
        linked.map_err(|e| Self::io_error(key, "write", e))?;

        tracing::info!(key, size = bytes.len(), "Stored object");
        Ok(UploadReceipt::new(key, bytes, content_type))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Self::io_error(key, "delete", e))?;
        tracing::info!(key, "Deleted object");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.object_path(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    #[tracing::instrument(skip(self))]
    async fn relocate(&self, from: &str, to: &str) -> Result<(), StorageError> {
        let source = self.object_path(from)?;
        let target = self.object_path(to)?;

        if !tokio::fs::try_exists(&source).await.unwrap_or(false) {
            return Err(StorageError::new(StorageErrorKind::NotFound(from.to_string())));
        }
        Self::ensure_parent(&target).await?;

        tokio::fs::hard_link(&source, &target)
            .await
            .map_err(|e| Self::io_error(to, "relocate", e))?;
        tokio::fs::remove_file(&source)
            .await
            .map_err(|e| Self::io_error(from, "relocate", e))?;

        tracing::info!(from, to, "Relocated object");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let storage = self.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || storage.walk(&prefix))
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::FileRead(e.to_string())))?
    }
}
