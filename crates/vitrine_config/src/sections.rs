//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which record store implementation to use.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordBackend {
    /// PostgREST over HTTP
    #[default]
    Rest,
    /// Process-local store, for dry runs
    Memory,
    /// Direct PostgreSQL connection
    Postgres,
}

/// Which object storage implementation to use.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageBackend {
    /// Hosted storage REST API
    #[default]
    Rest,
    /// Local directory
    Filesystem,
    /// Process-local store, for dry runs
    Memory,
}

/// When the previous media object is removed during a replace.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CleanupOrder {
    /// Delete old, upload new, update record.
    ///
    /// An upload failure after the delete leaves the record pointing at a
    /// missing object.
    #[default]
    DeleteFirst,
    /// Upload new, update record, delete old.
    ///
    /// An upload failure never loses the old object; a failed delete leaves
    /// an unreferenced object behind.
    UploadFirst,
}

/// Where the record and storage backends live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Record store implementation
    pub records: RecordBackend,
    /// Base URL of the hosted project
    pub api_base_url: String,
    /// Base URL public objects are served from; `api_base_url` when empty
    pub storage_base_url: String,
    /// Service key sent as `apikey` and bearer token
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// PostgreSQL connection string for the `postgres` record store
    #[serde(skip_serializing)]
    pub database_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            records: RecordBackend::Rest,
            api_base_url: String::new(),
            storage_base_url: String::new(),
            api_key: None,
            database_url: None,
            request_timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL for public object links.
    pub fn effective_storage_base_url(&self) -> &str {
        if self.storage_base_url.trim().is_empty() {
            &self.api_base_url
        } else {
            &self.storage_base_url
        }
    }
}

/// Object storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage implementation
    pub backend: StorageBackend,
    /// Bucket holding every media object
    pub bucket: String,
    /// Namespace for inline images of unsaved drafts
    pub temp_prefix: String,
    /// Root directory for the filesystem backend
    pub local_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Rest,
            bucket: "uploads".to_string(),
            temp_prefix: "temp/".to_string(),
            local_root: "./vitrine-storage".to_string(),
        }
    }
}

/// Media replace policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// When the previous object is removed
    pub cleanup_order: CleanupOrder,
    /// Delete the new object when the record update fails
    pub compensate_orphans: bool,
}

/// Temp namespace sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Age after which a temp object counts as abandoned
    pub max_age_hours: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { max_age_hours: 24 }
    }
}

impl SweepConfig {
    /// Maximum age as a duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(3600))
    }
}

/// List screen settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Rows per page
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}
