//! Backend selection from configuration.

use std::sync::Arc;
use tracing::info;
use vitrine_config::{RecordBackend, StorageBackend, VitrineConfig};
use vitrine_error::{ConfigError, VitrineResult};
use vitrine_records::{MemoryRecordStore, RecordStore, RestRecordStore};
use vitrine_storage::{
    FileSystemStorage, MemoryStorage, ObjectStorage, RestStorage, RestStorageConfig,
};
use vitrine_sync::{GallerySync, MediaSync, SyncPolicy, TempMediaPromoter, TempSweeper};

#[cfg(feature = "database")]
const POOL_SIZE: u32 = 4;

/// The storage and record backends selected by configuration.
#[derive(Clone)]
pub struct Backends {
    /// Object storage
    pub storage: Arc<dyn ObjectStorage>,
    /// Record store
    pub records: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("storage", &self.storage.backend_name())
            .field("records", &self.records.backend_name())
            .finish()
    }
}

fn api_key(config: &VitrineConfig) -> &str {
    config.backend.api_key.as_deref().unwrap_or_default()
}

fn storage_from(config: &VitrineConfig) -> VitrineResult<Arc<dyn ObjectStorage>> {
    let public_base = config.public_url_base();
    Ok(match config.storage.backend {
        StorageBackend::Rest => {
            let rest = RestStorageConfig::new(&config.backend.api_base_url, api_key(config), public_base)
                .with_timeout(config.backend.request_timeout());
            Arc::new(RestStorage::new(rest)?)
        }
        StorageBackend::Filesystem => Arc::new(
            FileSystemStorage::new(&config.storage.local_root, &config.storage.bucket)?
                .with_public_base(public_base),
        ),
        StorageBackend::Memory => {
            Arc::new(MemoryStorage::new(&config.storage.bucket).with_public_base(public_base))
        }
    })
}

fn records_from(config: &VitrineConfig) -> VitrineResult<Arc<dyn RecordStore>> {
    Ok(match config.backend.records {
        RecordBackend::Rest => Arc::new(RestRecordStore::new(
            &config.backend.api_base_url,
            api_key(config),
            config.backend.request_timeout(),
        )?),
        RecordBackend::Memory => Arc::new(MemoryRecordStore::new()),
        RecordBackend::Postgres => postgres_from(config)?,
    })
}

#[cfg(feature = "database")]
fn postgres_from(config: &VitrineConfig) -> VitrineResult<Arc<dyn RecordStore>> {
    let url = config.backend.database_url.as_deref().unwrap_or_default();
    Ok(Arc::new(vitrine_database::PgRecordStore::connect(url, POOL_SIZE)?))
}

#[cfg(not(feature = "database"))]
fn postgres_from(_config: &VitrineConfig) -> VitrineResult<Arc<dyn RecordStore>> {
    Err(ConfigError::new(
        "backend.records = \"postgres\" requires building with --features database",
    )
    .into())
}

impl Backends {
    /// Validate the configuration and open both backends.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for missing settings, or the error of
    /// the backend that failed to open.
    pub fn from_config(config: &VitrineConfig) -> VitrineResult<Self> {
        config.validate()?;
        let storage = storage_from(config)?;
        let records = records_from(config)?;
        info!(
            storage = storage.backend_name(),
            records = records.backend_name(),
            bucket = %config.storage.bucket,
            "Backends ready"
        );
        Ok(Self { storage, records })
    }

    /// Replace/remove/cascade workflows with the configured policy.
    pub fn media_sync(&self, config: &VitrineConfig) -> MediaSync {
        MediaSync::new(Arc::clone(&self.storage), Arc::clone(&self.records))
            .with_policy(SyncPolicy::from(&config.sync))
    }

    /// Gallery workflows with the configured policy.
    pub fn gallery(&self, config: &VitrineConfig) -> GallerySync {
        GallerySync::new(Arc::clone(&self.storage), Arc::clone(&self.records))
            .with_policy(SyncPolicy::from(&config.sync))
    }

    /// Inline image promoter for the configured temp namespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the temp prefix is blank.
    pub fn promoter(&self, config: &VitrineConfig) -> VitrineResult<TempMediaPromoter> {
        TempMediaPromoter::new(
            Arc::clone(&self.storage),
            Arc::clone(&self.records),
            config.temp_prefix(),
        )
    }

    /// Temp sweeper for the configured temp namespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the temp prefix is blank.
    pub fn sweeper(&self, config: &VitrineConfig) -> VitrineResult<TempSweeper> {
        TempSweeper::new(Arc::clone(&self.storage), &config.temp_prefix())
    }
}
