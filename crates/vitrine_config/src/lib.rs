//! Configuration for the Vitrine media-sync toolkit.
//!
//! Values are layered, later sources overriding earlier ones:
//! 1. Bundled defaults (`vitrine.toml` shipped with the crate)
//! 2. `~/.config/vitrine/vitrine.toml`
//! 3. `./vitrine.toml`
//! 4. Environment variables `VITRINE__SECTION__KEY`
//!
//! Secrets (`backend.api_key`, `backend.database_url`) are expected to come from
//! the environment.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod sections;

pub use config::VitrineConfig;
pub use sections::{
    BackendConfig, CleanupOrder, ListingConfig, RecordBackend, StorageBackend, StorageConfig,
    SweepConfig, SyncConfig,
};
