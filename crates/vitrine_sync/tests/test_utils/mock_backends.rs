//! Fault-injecting backends that record every call.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Mutex;
use vitrine_core::{ContentRecord, EntityId, EntityKind, PublicUrlBase, RecordPatch};
use vitrine_records::{MemoryRecordStore, RecordStore};
use vitrine_error::{RecordError, RecordErrorKind, StorageError, StorageErrorKind};
use vitrine_storage::{MemoryStorage, ObjectInfo, ObjectStorage, UploadReceipt};

/// A storage call as observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Upload(String),
    Delete(String),
    Relocate(String, String),
    List(String),
}

#[derive(Debug, Default)]
struct StorageFaults {
    upload: Option<StorageErrorKind>,
    uploads_before_failure: Option<usize>,
    delete: Option<StorageErrorKind>,
    relocate_keys: Vec<String>,
}

/// In-memory storage with injectable failures.
#[derive(Debug)]
pub struct MockStorage {
    inner: MemoryStorage,
    faults: Mutex<StorageFaults>,
    calls: Mutex<Vec<StorageCall>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::new("uploads")
                .with_public_base(PublicUrlBase::new("https://demo.supabase.co", "uploads")),
            faults: Mutex::new(StorageFaults::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    /// Put an object in place without recording a call.
    pub fn put(&self, key: &str) {
        self.inner.insert_at(key, b"existing", chrono::Utc::now());
    }

    pub fn fail_uploads(&self, kind: StorageErrorKind) {
        self.faults.lock().unwrap().upload = Some(kind);
    }

    /// Let `n` uploads succeed, then fail the rest with a transport error.
    pub fn fail_uploads_after(&self, n: usize) {
        self.faults.lock().unwrap().uploads_before_failure = Some(n);
    }

    pub fn fail_deletes(&self, kind: StorageErrorKind) {
        self.faults.lock().unwrap().delete = Some(kind);
    }

    pub fn fail_relocate(&self, key: &str) {
        self.faults.lock().unwrap().relocate_keys.push(key.to_string());
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::Upload(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::Delete(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read(key).is_some()
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    fn public_base(&self) -> &PublicUrlBase {
        self.inner.public_base()
    }

    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<UploadReceipt, StorageError> {
        self.record(StorageCall::Upload(key.to_string()));
        {
            let mut faults = self.faults.lock().unwrap();
            if let Some(kind) = faults.upload.clone() {
                return Err(StorageError::new(kind));
            }
            if let Some(left) = faults.uploads_before_failure.as_mut() {
                if *left == 0 {
                    return Err(StorageError::new(StorageErrorKind::Transport(
                        "connection reset".to_string(),
                    )));
                }
                *left -= 1;
            }
        }
        self.inner.upload(key, bytes, content_type).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.record(StorageCall::Delete(key.to_string()));
        if let Some(kind) = self.faults.lock().unwrap().delete.clone() {
            return Err(StorageError::new(kind));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    async fn relocate(&self, from: &str, to: &str) -> Result<(), StorageError> {
        self.record(StorageCall::Relocate(from.to_string(), to.to_string()));
        if self.faults.lock().unwrap().relocate_keys.iter().any(|k| k == from) {
            return Err(StorageError::new(StorageErrorKind::Transport(
                "move timed out".to_string(),
            )));
        }
        self.inner.relocate(from, to).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        self.record(StorageCall::List(prefix.to_string()));
        self.inner.list(prefix).await
    }
}

/// A record call as observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCall {
    Create(EntityKind, RecordPatch),
    Update(EntityKind, EntityId, RecordPatch),
    Delete(EntityKind, EntityId),
}

#[derive(Debug, Default)]
struct RecordFaults {
    update: Option<RecordErrorKind>,
    creates_before_failure: Option<usize>,
    delete: Option<RecordErrorKind>,
}

/// In-memory record store with injectable failures.
#[derive(Debug, Default)]
pub struct MockRecords {
    inner: MemoryRecordStore,
    faults: Mutex<RecordFaults>,
    calls: Mutex<Vec<RecordCall>>,
}

impl MockRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, kind: EntityKind, row: JsonValue) -> ContentRecord {
        self.inner.seed(kind, row).unwrap()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.inner.count(kind)
    }

    pub fn fail_updates(&self, kind: RecordErrorKind) {
        self.faults.lock().unwrap().update = Some(kind);
    }

    pub fn fail_creates_after(&self, n: usize) {
        self.faults.lock().unwrap().creates_before_failure = Some(n);
    }

    pub fn fail_deletes(&self, kind: RecordErrorKind) {
        self.faults.lock().unwrap().delete = Some(kind);
    }

    pub fn calls(&self) -> Vec<RecordCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<RecordPatch> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RecordCall::Update(_, _, patch) => Some(patch),
                _ => None,
            })
            .collect()
    }

    pub async fn row(&self, kind: EntityKind, id: &EntityId) -> ContentRecord {
        self.inner.get_by_id(kind, id).await.unwrap()
    }

    fn record(&self, call: RecordCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RecordStore for MockRecords {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn create(
        &self,
        kind: EntityKind,
        fields: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        self.record(RecordCall::Create(kind, fields.clone()));
        if let Some(left) = self.faults.lock().unwrap().creates_before_failure.as_mut() {
            if *left == 0 {
                return Err(RecordError::new(RecordErrorKind::Transport(
                    "insert timed out".to_string(),
                )));
            }
            *left -= 1;
        }
        self.inner.create(kind, fields).await
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        self.record(RecordCall::Update(kind, id.clone(), patch.clone()));
        if let Some(error) = self.faults.lock().unwrap().update.clone() {
            return Err(RecordError::new(error));
        }
        self.inner.update(kind, id, patch).await
    }

    async fn get_all(&self, kind: EntityKind) -> Result<Vec<ContentRecord>, RecordError> {
        self.inner.get_all(kind).await
    }

    async fn get_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<ContentRecord, RecordError> {
        self.inner.get_by_id(kind, id).await
    }

    async fn find_by(
        &self,
        kind: EntityKind,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<ContentRecord>, RecordError> {
        self.inner.find_by(kind, field, value).await
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RecordError> {
        self.record(RecordCall::Delete(kind, id.clone()));
        if let Some(error) = self.faults.lock().unwrap().delete.clone() {
            return Err(RecordError::new(error));
        }
        self.inner.delete(kind, id).await
    }
}
