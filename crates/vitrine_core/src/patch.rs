//! Partial-update payloads.

use crate::MediaPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Column/value pairs sent to the record store for a partial update.
///
/// Only the columns present in the patch change; a column set to `null`
/// is cleared.
///
/// # Examples
///
/// ```
/// use vitrine_core::{MediaPath, RecordPatch};
///
/// let mut patch = RecordPatch::new();
/// patch.set("title", "Spring campaign");
/// patch.set_media("banner_media", MediaPath::parse("/uploads/a.jpg").as_ref());
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPatch(Map<String, JsonValue>);

impl RecordPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column to a value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set (or clear, with `None`) a media column.
    pub fn set_media(&mut self, field: impl Into<String>, path: Option<&MediaPath>) -> &mut Self {
        let value = path
            .map(|p| JsonValue::String(p.as_str().to_string()))
            .unwrap_or(JsonValue::Null);
        self.0.insert(field.into(), value);
        self
    }

    /// Copy every column of `other` into this patch, overwriting on collision.
    pub fn merge(&mut self, other: RecordPatch) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    /// Value staged for a column.
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.0.get(field)
    }

    /// Columns touched by this patch.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of columns touched.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Consume into the underlying JSON map.
    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }
}

impl From<Map<String, JsonValue>> for RecordPatch {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}
