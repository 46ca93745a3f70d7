//! Record store trait definition.

use serde_json::Value as JsonValue;
use vitrine_core::{ContentRecord, EntityId, EntityKind, RecordPatch};
use vitrine_error::RecordError;

/// Trait for record store backends.
///
/// Writes are last-writer-wins; no backend offers locking or transactions
/// spanning calls.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Insert a row; the store assigns `id` and `created_at`.
    async fn create(
        &self,
        kind: EntityKind,
        fields: RecordPatch,
    ) -> Result<ContentRecord, RecordError>;

    /// Apply a partial update and return the updated row.
    ///
    /// # Errors
    ///
    /// `NotFound` if no row has this id.
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: RecordPatch,
    ) -> Result<ContentRecord, RecordError>;

    /// Every row of a kind, ordered by the kind's order column (unset last)
    /// and then newest first.
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<ContentRecord>, RecordError>;

    /// One row by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no row has this id.
    async fn get_by_id(&self, kind: EntityKind, id: &EntityId)
    -> Result<ContentRecord, RecordError>;

    /// Rows whose column equals a value, in display order.
    async fn find_by(
        &self,
        kind: EntityKind,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<ContentRecord>, RecordError>;

    /// Delete one row.
    ///
    /// # Errors
    ///
    /// `NotFound` if no row has this id.
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RecordError>;
}
