//! Storage trait definition.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use vitrine_core::PublicUrlBase;
use vitrine_error::{StorageError, StorageErrorKind};

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct UploadReceipt {
    /// Committed key inside the bucket
    path: String,
    /// Size in bytes
    size: u64,
    /// SHA-256 of the content, hex encoded
    content_hash: String,
    /// Content type the object was stored with
    content_type: String,
}

impl UploadReceipt {
    /// Describe an object that was just written.
    pub fn new(path: impl Into<String>, bytes: &[u8], content_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: bytes.len() as u64,
            content_hash: content_hash(bytes),
            content_type: content_type.into(),
        }
    }
}

/// A listed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct ObjectInfo {
    /// Key inside the bucket
    path: String,
    /// Size in bytes, if the backend reports it
    size: Option<u64>,
    /// Last modification time, if the backend reports it
    last_modified: Option<DateTime<Utc>>,
}

impl ObjectInfo {
    /// Describe a listed object.
    pub fn new(
        path: impl Into<String>,
        size: Option<u64>,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            last_modified,
        }
    }
}

/// Compute the SHA-256 hash of data.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Check that a key is a plain relative path inside the bucket.
///
/// # Errors
///
/// Returns `InvalidPath` for empty keys, absolute keys, backslashes, and `.`
/// or `..` segments.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.ends_with('/')
        || key.contains('\\')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(StorageError::new(StorageErrorKind::InvalidPath(
            key.to_string(),
        )));
    }
    Ok(())
}

/// Trait for object storage backends.
///
/// Keys are bucket-relative (`news-1700000000000-k3j9x0a1b2c3.jpg`,
/// `temp/news-content-….png`). Implementations never overwrite an existing
/// object.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Where public objects of this backend are served from.
    fn public_base(&self) -> &PublicUrlBase;

    /// Store bytes at a key.
    ///
    /// # Errors
    ///
    /// `Conflict` if an object already exists at the key, `Transport` if the
    /// backend cannot be reached.
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<UploadReceipt, StorageError>;

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored at the key.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Whether an object exists at a key.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Move an object to a new key without re-uploading it.
    ///
    /// # Errors
    ///
    /// `NotFound` if `from` is missing, `Conflict` if `to` is taken.
    async fn relocate(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// List objects whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError>;

    /// Public URL of a key.
    fn public_url(&self, key: &str) -> String {
        self.public_base().url_for(key)
    }
}
