//! In-memory object storage.

use crate::{ObjectInfo, ObjectStorage, UploadReceipt, validate_key};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;
use vitrine_core::PublicUrlBase;
use vitrine_error::{StorageError, StorageErrorKind};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    last_modified: DateTime<Utc>,
}

/// Process-local storage backend.
///
/// Used for dry runs of the CLI and as the default backend in tests.
#[derive(Debug)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    public_base: PublicUrlBase,
}

impl MemoryStorage {
    /// Create an empty store for a bucket.
    pub fn new(bucket: &str) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            public_base: PublicUrlBase::new("memory://vitrine", bucket),
        }
    }

    /// Serve public URLs from a different base.
    pub fn with_public_base(mut self, public_base: PublicUrlBase) -> Self {
        self.public_base = public_base;
        self
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store an object with an explicit modification time, replacing any
    /// existing one.
    pub fn insert_at(&self, key: &str, bytes: &[u8], last_modified: DateTime<Utc>) {
        self.objects().insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                last_modified,
            },
        );
    }

    /// Bytes stored at a key.
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).map(|o| o.bytes.clone())
    }

    /// Every stored key, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
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
        validate_key(key)?;
        let mut objects = self.objects();
        if objects.contains_key(key) {
            return Err(StorageError::new(StorageErrorKind::Conflict(key.to_string())));
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                last_modified: Utc::now(),
            },
        );
        tracing::debug!(key, "Stored object in memory");
        Ok(UploadReceipt::new(key, bytes, content_type))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.objects()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(key.to_string())))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        Ok(self.objects().contains_key(key))
    }

    #[tracing::instrument(skip(self))]
    async fn relocate(&self, from: &str, to: &str) -> Result<(), StorageError> {
        validate_key(from)?;
        validate_key(to)?;
        let mut objects = self.objects();
        if objects.contains_key(to) {
            return Err(StorageError::new(StorageErrorKind::Conflict(to.to_string())));
        }
        let object = objects
            .remove(from)
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(from.to_string())))?;
        objects.insert(to.to_string(), object);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        Ok(self
            .objects()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, o)| {
                ObjectInfo::new(key.clone(), Some(o.bytes.len() as u64), Some(o.last_modified))
            })
            .collect())
    }
}
