//! Shared helpers for sync tests.

#![allow(dead_code)]

mod mock_backends;

pub use mock_backends::{MockRecords, MockStorage, RecordCall, StorageCall};

use std::sync::Arc;
use vitrine_sync::MediaSync;

/// Storage, records and an orchestrator wired together.
pub fn setup() -> (Arc<MockStorage>, Arc<MockRecords>, MediaSync) {
    let storage = Arc::new(MockStorage::new());
    let records = Arc::new(MockRecords::new());
    let sync = MediaSync::new(storage.clone(), records.clone());
    (storage, records, sync)
}
