//! In-memory record store.

use crate::{RecordStore, filter_literal, validate_identifier};
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use vitrine_core::{ContentRecord, EntityId, EntityKind, RecordPatch, sort_for_display};
use vitrine_error::{RecordError, RecordErrorKind};

/// Process-local record store.
///
/// Rows keep insertion order, so display-order ties fall back to it exactly as
/// they would for rows created in sequence.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<EntityKind, Vec<ContentRecord>>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, HashMap<EntityKind, Vec<ContentRecord>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a row exactly as given; it must carry an `id`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the row is not an object with an id.
    pub fn seed(&self, kind: EntityKind, row: JsonValue) -> Result<ContentRecord, RecordError> {
        let record = ContentRecord::from_row(kind, row)?;
        self.tables().entry(kind).or_default().push(record.clone());
        Ok(record)
    }

    /// Number of rows of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables().get(&kind).map_or(0, Vec::len)
    }

    fn not_found(kind: EntityKind, id: &EntityId) -> RecordError {
        RecordError::not_found(kind.table(), id.as_str())
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    #[tracing::instrument(skip(self, fields), fields(table = kind.table()))]
    async fn create(
        &self,
        kind: EntityKind,
        fields: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        for key in fields.fields() {
            validate_identifier(key)?;
        }

        let mut row = fields.into_map();
        let id = uuid::Uuid::new_v4().to_string();
        row.insert("id".to_string(), JsonValue::String(id));
        row.entry("created_at".to_string())
            .or_insert_with(|| JsonValue::String(Utc::now().to_rfc3339()));

        let record = ContentRecord::from_row(kind, JsonValue::Object(row))?;
        self.tables().entry(kind).or_default().push(record.clone());
        tracing::debug!(id = %record.id(), "Created row");
        Ok(record)
    }

    #[tracing::instrument(skip(self, patch), fields(table = kind.table(), id = %id))]
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        for key in patch.fields() {
            validate_identifier(key)?;
        }

        let mut tables = self.tables();
        let record = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|r| r.id() == id))
            .ok_or_else(|| Self::not_found(kind, id))?;
        record.apply(&patch);
        Ok(record.clone())
    }

    async fn get_all(&self, kind: EntityKind) -> Result<Vec<ContentRecord>, RecordError> {
        let mut rows = self.tables().get(&kind).cloned().unwrap_or_default();
        sort_for_display(&mut rows);
        Ok(rows)
    }

    async fn get_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<ContentRecord, RecordError> {
        self.tables()
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.id() == id).cloned())
            .ok_or_else(|| Self::not_found(kind, id))
    }

    async fn find_by(
        &self,
        kind: EntityKind,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<ContentRecord>, RecordError> {
        validate_identifier(field)?;
        let wanted = filter_literal(value)?;

        let mut rows: Vec<ContentRecord> = self
            .tables()
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|r| {
                        r.field(field)
                            .and_then(|v| filter_literal(v).ok())
                            .is_some_and(|v| v == wanted)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_for_display(&mut rows);
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(table = kind.table(), id = %id))]
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RecordError> {
        let mut tables = self.tables();
        let rows = tables
            .get_mut(&kind)
            .ok_or_else(|| Self::not_found(kind, id))?;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(RecordError::new(RecordErrorKind::NotFound {
                table: kind.table().to_string(),
                id: id.to_string(),
            }));
        }
        Ok(())
    }
}
