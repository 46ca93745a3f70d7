//! Storage backend for a hosted storage REST API.
//!
//! Endpoints (relative to the project URL):
//!
//! | Operation | Request |
//! |---|---|
//! | upload | `POST /storage/v1/object/{bucket}/{key}` with `x-upsert: false` |
//! | delete | `DELETE /storage/v1/object/{bucket}` with `{"prefixes": [key]}` |
//! | exists | `HEAD /storage/v1/object/{bucket}/{key}` |
//! | relocate | `POST /storage/v1/object/move` |
//! | list | `POST /storage/v1/object/list/{bucket}` |

use crate::{ObjectInfo, ObjectStorage, UploadReceipt, validate_key};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, instrument};
use vitrine_core::PublicUrlBase;
use vitrine_error::{HttpError, StorageError, StorageErrorKind, VitrineResult};

const LIST_PAGE: usize = 100;

/// Connection settings for [`RestStorage`].
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct RestStorageConfig {
    api_base_url: String,
    api_key: String,
    public_base: PublicUrlBase,
    timeout: Duration,
}

impl RestStorageConfig {
    /// Settings for a project URL, service key and public URL base.
    pub fn new(
        api_base_url: impl Into<String>,
        api_key: impl Into<String>,
        public_base: PublicUrlBase,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            public_base,
            timeout: Duration::from_secs(30),
        }
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Object storage over the hosted storage REST API.
#[derive(Debug, Clone)]
pub struct RestStorage {
    config: RestStorageConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    id: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    metadata: Option<ListMetadata>,
}

#[derive(Debug, Deserialize)]
struct ListMetadata {
    size: Option<u64>,
}

impl RestStorage {
    /// Create a client with the service key attached to every request.
    ///
    /// # Errors
    ///
    /// Returns an HTTP error if the key is not a valid header value or the
    /// client cannot be built.
    #[instrument(skip(config), fields(base_url = %config.api_base_url, bucket = %config.public_base.bucket()))]
    pub fn new(config: RestStorageConfig) -> VitrineResult<Self> {
        debug!("Creating storage client");

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| HttpError::new(format!("Invalid API key header: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| HttpError::new(format!("Invalid API key header: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn bucket(&self) -> &str {
        self.config.public_base.bucket()
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.api_base_url,
            self.bucket(),
            key
        )
    }

    fn transport(e: reqwest::Error) -> StorageError {
        error!("Storage request failed: {}", e);
        StorageError::new(StorageErrorKind::Transport(e.to_string()))
    }

    async fn failure(key: &str, response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(%status, key, "Storage API returned error");
        classify_failure(status, &body, key)
    }
}

/// Map an error response to the storage taxonomy.
///
/// The API reports some conflicts and misses as `400` with the real status in
/// the JSON body (`{"statusCode": "409", "error": "Duplicate"}`).
fn classify_failure(status: StatusCode, body: &str, key: &str) -> StorageError {
    let embedded = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("statusCode").and_then(|s| match s {
                serde_json::Value::String(s) => s.parse::<u16>().ok(),
                serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                _ => None,
            })
        });
    let effective = match (status, embedded) {
        (StatusCode::BAD_REQUEST, Some(code)) => code,
        _ => status.as_u16(),
    };

    let kind = match effective {
        404 => StorageErrorKind::NotFound(key.to_string()),
        409 => StorageErrorKind::Conflict(key.to_string()),
        401 | 403 => StorageErrorKind::PermissionDenied(format!("{}: {}", key, body)),
        status => StorageErrorKind::Api {
            status,
            message: body.to_string(),
        },
    };
    StorageError::new(kind)
}

/// Split a listing prefix into the folder the API lists and a name filter.
fn split_prefix(prefix: &str) -> (&str, &str) {
    match prefix.rfind('/') {
        Some(pos) => (&prefix[..pos], &prefix[pos + 1..]),
        None => ("", prefix),
    }
}

#[async_trait::async_trait]
impl ObjectStorage for RestStorage {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    fn public_base(&self) -> &PublicUrlBase {
        &self.config.public_base
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<UploadReceipt, StorageError> {
        validate_key(key)?;
        debug!("Uploading object");

        let response = self
            .client
            .post(self.object_url(key))
            .header("x-upsert", "false")
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::failure(key, response).await);
        }

        tracing::info!(key, size = bytes.len(), "Uploaded object");
        Ok(UploadReceipt::new(key, bytes, content_type))
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        let response = self
            .client
            .delete(format!(
                "{}/storage/v1/object/{}",
                self.config.api_base_url,
                self.bucket()
            ))
            .json(&json!({ "prefixes": [key] }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            return Err(Self::failure(key, response).await);
        }

        // The API answers 200 with the removed objects; an empty list means
        // nothing was stored at the key.
        let removed: Vec<serde_json::Value> = response.json().await.unwrap_or_default();
        if removed.is_empty() {
            return Err(StorageError::new(StorageErrorKind::NotFound(key.to_string())));
        }

        tracing::info!(key, "Deleted object");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;

        let response = self
            .client
            .head(self.object_url(key))
            .send()
            .await
            .map_err(Self::transport)?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(false),
            _ => Err(Self::failure(key, response).await),
        }
    }

    #[instrument(skip(self))]
    async fn relocate(&self, from: &str, to: &str) -> Result<(), StorageError> {
        validate_key(from)?;
        validate_key(to)?;

        let response = self
            .client
            .post(format!("{}/storage/v1/object/move", self.config.api_base_url))
            .json(&json!({
                "bucketId": self.bucket(),
                "sourceKey": from,
                "destinationKey": to,
            }))
            .send()
            .await
            .map_err(Self::transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, from, to, "Storage move failed");
            let err = classify_failure(status, &body, from);
            // A conflict concerns the destination key.
            return Err(match err.kind {
                StorageErrorKind::Conflict(_) => {
                    StorageError::new(StorageErrorKind::Conflict(to.to_string()))
                }
                _ => err,
            });
        }

        tracing::info!(from, to, "Relocated object");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        let (folder, search) = split_prefix(prefix);
        let mut objects = Vec::new();
        let mut offset = 0;

        loop {
            let response = self
                .client
                .post(format!(
                    "{}/storage/v1/object/list/{}",
                    self.config.api_base_url,
                    self.bucket()
                ))
                .json(&json!({
                    "prefix": folder,
                    "search": search,
                    "limit": LIST_PAGE,
                    "offset": offset,
                    "sortBy": { "column": "name", "order": "asc" },
                }))
                .send()
                .await
                .map_err(Self::transport)?;

            if !response.status().is_success() {
                return Err(Self::failure(prefix, response).await);
            }

            let entries: Vec<ListEntry> = response.json().await.map_err(|e| {
                error!("Failed to parse listing: {}", e);
                StorageError::new(StorageErrorKind::Api {
                    status: 200,
                    message: format!("Failed to parse listing: {}", e),
                })
            })?;
            let page_len = entries.len();

            // Entries without an id are folders.
            objects.extend(entries.into_iter().filter(|e| e.id.is_some()).map(|e| {
                let path = if folder.is_empty() {
                    e.name
                } else {
                    format!("{}/{}", folder, e.name)
                };
                ObjectInfo::new(
                    path,
                    e.metadata.and_then(|m| m.size),
                    e.updated_at.or(e.created_at),
                )
            }));

            if page_len < LIST_PAGE {
                break;
            }
            offset += LIST_PAGE;
        }

        debug!(count = objects.len(), "Listed objects");
        Ok(objects)
    }
}
