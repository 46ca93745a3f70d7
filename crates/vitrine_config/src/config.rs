//! Loading and checking the top-level configuration.

use crate::{BackendConfig, ListingConfig, RecordBackend, StorageBackend, StorageConfig, SweepConfig, SyncConfig};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vitrine_core::PublicUrlBase;
use vitrine_error::{ConfigError, VitrineResult};

const DEFAULT_CONFIG: &str = include_str!("../../../vitrine.toml");

/// Top-level Vitrine configuration.
///
/// # Example
///
/// ```no_run
/// use vitrine_config::VitrineConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = VitrineConfig::load()?;
/// config.validate()?;
/// println!("bucket: {}", config.storage.bucket);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrineConfig {
    /// Backend locations and credentials
    pub backend: BackendConfig,
    /// Object storage settings
    pub storage: StorageConfig,
    /// Media replace policy
    pub sync: SyncConfig,
    /// Temp sweep settings
    pub sweep: SweepConfig,
    /// List screen settings
    pub listing: ListingConfig,
}

fn defaults() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> VitrineResult<VitrineConfig> {
    builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
        .try_deserialize()
        .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
}

impl VitrineConfig {
    /// Load with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// Missing user files are skipped silently.
    #[instrument]
    pub fn load() -> VitrineResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder = defaults();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vitrine/vitrine.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("vitrine").required(false))
            .add_source(
                Environment::with_prefix("VITRINE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        finish(builder)
    }

    /// Load bundled defaults overridden by one specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> VitrineResult<Self> {
        debug!("Loading configuration from file");
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::new(format!(
                "Configuration file {} does not exist",
                path.display()
            ))
            .into());
        }
        finish(defaults().add_source(File::from(path)))
    }

    /// Load bundled defaults overridden by TOML text.
    pub fn from_toml_str(toml: &str) -> VitrineResult<Self> {
        finish(defaults().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    /// Check that every value the selected backends need is present.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing or invalid value.
    pub fn validate(&self) -> VitrineResult<()> {
        let needs_http = self.backend.records == RecordBackend::Rest
            || self.storage.backend == StorageBackend::Rest;

        if needs_http {
            let base = self.backend.api_base_url.trim();
            if base.is_empty() {
                return Err(ConfigError::new("backend.api_base_url is not set").into());
            }
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::new(format!(
                    "backend.api_base_url must be an http(s) URL, got '{}'",
                    base
                ))
                .into());
            }
            if self.backend.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                return Err(ConfigError::new(
                    "backend.api_key is not set (use VITRINE__BACKEND__API_KEY)",
                )
                .into());
            }
        }

        if self.backend.records == RecordBackend::Postgres
            && self.backend.database_url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::new(
                "backend.database_url is not set (use VITRINE__BACKEND__DATABASE_URL)",
            )
            .into());
        }

        if self.storage.bucket.trim().is_empty() || self.storage.bucket.contains('/') {
            return Err(ConfigError::new(format!(
                "storage.bucket '{}' is not a bucket name",
                self.storage.bucket
            ))
            .into());
        }

        if self.temp_prefix().is_empty() {
            return Err(ConfigError::new("storage.temp_prefix must not be empty").into());
        }

        if self.listing.page_size == 0 {
            return Err(ConfigError::new("listing.page_size must be at least 1").into());
        }

        Ok(())
    }

    /// Temp namespace, always ending in `/`.
    pub fn temp_prefix(&self) -> String {
        let trimmed = self.storage.temp_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}/", trimmed)
        }
    }

    /// Public URL base for committed media.
    pub fn public_url_base(&self) -> PublicUrlBase {
        PublicUrlBase::new(
            self.backend.effective_storage_base_url(),
            self.storage.bucket.clone(),
        )
    }
}
