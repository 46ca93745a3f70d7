//! Rows returned by the record store.

use crate::{EntityId, EntityKind, MediaPath, RecordPatch};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use vitrine_error::{RecordError, RecordErrorKind};

/// One persisted content entity.
///
/// Domain columns are kept as a JSON map; the accessors below give typed views
/// of the columns the media workflow and list screens care about.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct ContentRecord {
    kind: EntityKind,
    id: EntityId,
    fields: Map<String, JsonValue>,
}

impl ContentRecord {
    /// Decode a row as returned by a JSON API.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the row is not an object or has no `id`.
    pub fn from_row(kind: EntityKind, row: JsonValue) -> Result<Self, RecordError> {
        let JsonValue::Object(fields) = row else {
            return Err(RecordError::new(RecordErrorKind::Serialization(format!(
                "expected an object row from '{}'",
                kind.table()
            ))));
        };

        let id = fields
            .get("id")
            .cloned()
            .ok_or_else(|| {
                RecordError::new(RecordErrorKind::Serialization(format!(
                    "row from '{}' has no id",
                    kind.table()
                )))
            })
            .and_then(|raw| {
                serde_json::from_value::<EntityId>(raw).map_err(|e| {
                    RecordError::new(RecordErrorKind::Serialization(e.to_string()))
                })
            })?;

        Ok(Self { kind, id, fields })
    }

    /// Raw value of a column.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// String value of a column.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(JsonValue::as_str)
    }

    /// Integer value of a column; numeric strings are accepted.
    pub fn int_field(&self, name: &str) -> Option<i64> {
        match self.fields.get(name)? {
            JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Committed media reference, if any.
    pub fn media_path(&self) -> Option<MediaPath> {
        self.kind
            .media_field()
            .and_then(|field| self.str_field(field))
            .and_then(MediaPath::parse)
    }

    /// Presentation order value, if the kind is orderable and it is set.
    pub fn order_value(&self) -> Option<i64> {
        self.kind.order_field().and_then(|f| self.int_field(f))
    }

    /// Creation timestamp, if present and parseable.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.str_field("created_at")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Title column, used by list search.
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// Parent id for child rows of a collection.
    pub fn parent_id(&self) -> Option<EntityId> {
        let field = self.kind.parent_field()?;
        serde_json::from_value(self.fields.get(field)?.clone()).ok()
    }

    /// Apply a patch in place (used by stores that keep rows in memory).
    pub fn apply(&mut self, patch: &RecordPatch) {
        for (key, value) in patch.as_map() {
            if key == "id" {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// The full row as JSON.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.fields.clone())
    }
}
