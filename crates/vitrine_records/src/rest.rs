//! Record store over a PostgREST API.

use crate::{RecordStore, filter_literal, validate_identifier};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, error, instrument};
use vitrine_core::{ContentRecord, EntityId, EntityKind, RecordPatch};
use vitrine_error::{HttpError, RecordError, RecordErrorKind, VitrineResult};

/// Record store backed by `{api_base_url}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    api_base_url: String,
    client: reqwest::Client,
}

/// PostgREST `order` parameter for a kind's display order.
fn order_clause(kind: EntityKind) -> String {
    match kind.order_field() {
        Some(field) => format!("{}.asc.nullslast,created_at.desc", field),
        None => "created_at.desc".to_string(),
    }
}

fn classify_failure(status: StatusCode, body: &str, kind: EntityKind, id: Option<&str>) -> RecordError {
    let record_kind = match status {
        StatusCode::NOT_FOUND => match id {
            Some(id) => RecordErrorKind::NotFound {
                table: kind.table().to_string(),
                id: id.to_string(),
            },
            None => RecordErrorKind::InvalidQuery(format!("table '{}': {}", kind.table(), body)),
        },
        StatusCode::CONFLICT => RecordErrorKind::Conflict(body.to_string()),
        StatusCode::BAD_REQUEST => RecordErrorKind::InvalidQuery(body.to_string()),
        status => RecordErrorKind::Api {
            status: status.as_u16(),
            message: body.to_string(),
        },
    };
    RecordError::new(record_kind)
}

impl RestRecordStore {
    /// Create a client with the service key attached to every request.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the key is not a valid header value or the
    /// client cannot be built.
    #[instrument(skip(api_key))]
    pub fn new(api_base_url: &str, api_key: &str, timeout: Duration) -> VitrineResult<Self> {
        debug!("Creating record client");

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| HttpError::new(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| HttpError::new(format!("Invalid API key header: {}", e)))?,
        );
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.api_base_url, kind.table())
    }

    /// Send a request and decode the returned rows.
    async fn rows(
        &self,
        kind: EntityKind,
        id: Option<&str>,
        request: RequestBuilder,
    ) -> Result<Vec<ContentRecord>, RecordError> {
        let response = request.send().await.map_err(|e| {
            error!("Record request failed: {}", e);
            RecordError::new(RecordErrorKind::Transport(e.to_string()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, table = kind.table(), "Record API returned error");
            return Err(classify_failure(status, &body, kind, id));
        }

        let rows: Vec<JsonValue> = response.json().await.map_err(|e| {
            error!("Failed to parse rows: {}", e);
            RecordError::new(RecordErrorKind::Serialization(format!(
                "Failed to parse rows: {}",
                e
            )))
        })?;

        rows.into_iter()
            .map(|row| ContentRecord::from_row(kind, row))
            .collect()
    }

    async fn single(
        &self,
        kind: EntityKind,
        id: &EntityId,
        request: RequestBuilder,
    ) -> Result<ContentRecord, RecordError> {
        self.rows(kind, Some(id.as_str()), request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RecordError::not_found(kind.table(), id.as_str()))
    }

    fn id_filter(id: &EntityId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }
}

#[async_trait::async_trait]
impl RecordStore for RestRecordStore {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self, fields), fields(table = kind.table()))]
    async fn create(
        &self,
        kind: EntityKind,
        fields: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        for key in fields.fields() {
            validate_identifier(key)?;
        }

        let request = self.client.post(self.table_url(kind)).json(fields.as_map());
        let record = self
            .rows(kind, None, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RecordError::new(RecordErrorKind::Serialization(format!(
                    "insert into '{}' returned no row",
                    kind.table()
                )))
            })?;

        tracing::info!(id = %record.id(), "Created row");
        Ok(record)
    }

    #[instrument(skip(self, patch), fields(table = kind.table(), id = %id, fields = patch.len()))]
    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: RecordPatch,
    ) -> Result<ContentRecord, RecordError> {
        for key in patch.fields() {
            validate_identifier(key)?;
        }

        let request = self
            .client
            .patch(self.table_url(kind))
            .query(&Self::id_filter(id))
            .json(patch.as_map());
        let record = self.single(kind, id, request).await?;

        tracing::info!("Updated row");
        Ok(record)
    }

    #[instrument(skip(self), fields(table = kind.table()))]
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<ContentRecord>, RecordError> {
        let request = self
            .client
            .get(self.table_url(kind))
            .query(&[("select", "*".to_string()), ("order", order_clause(kind))]);
        let rows = self.rows(kind, None, request).await?;
        debug!(count = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[instrument(skip(self), fields(table = kind.table(), id = %id))]
    async fn get_by_id(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<ContentRecord, RecordError> {
        let request = self
            .client
            .get(self.table_url(kind))
            .query(&[("select", "*".to_string())])
            .query(&Self::id_filter(id));
        self.single(kind, id, request).await
    }

    #[instrument(skip(self, value), fields(table = kind.table()))]
    async fn find_by(
        &self,
        kind: EntityKind,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<ContentRecord>, RecordError> {
        validate_identifier(field)?;
        let literal = filter_literal(value)?;

        let request = self.client.get(self.table_url(kind)).query(&[
            ("select", "*".to_string()),
            (field, format!("eq.{}", literal)),
            ("order", order_clause(kind)),
        ]);
        self.rows(kind, None, request).await
    }

    #[instrument(skip(self), fields(table = kind.table(), id = %id))]
    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RecordError> {
        let request = self
            .client
            .delete(self.table_url(kind))
            .query(&Self::id_filter(id));
        self.single(kind, id, request).await?;
        tracing::info!("Deleted row");
        Ok(())
    }
}
