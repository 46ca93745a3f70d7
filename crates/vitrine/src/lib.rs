//! Vitrine: media upload and record sync for a portfolio-site admin backend.
//!
//! Every content screen of the dashboard edits a row that references an object
//! in a storage bucket. Vitrine keeps the two in step: it uploads new media,
//! removes what a row no longer references, promotes inline images of
//! rich-text drafts out of the temp namespace, and maintains image galleries.
//!
//! # Architecture
//!
//! - `vitrine_error` - Error types and the failure taxonomy
//! - `vitrine_core` - Entity kinds, media paths, typed updates, list helpers
//! - `vitrine_config` - Layered configuration
//! - `vitrine_storage` - The `ObjectStorage` trait and its backends
//! - `vitrine_records` - The `RecordStore` trait and its backends
//! - `vitrine_database` - PostgreSQL record store (feature `database`)
//! - `vitrine_sync` - The sync workflows
//!
//! This crate re-exports everything and wires backends from configuration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vitrine::{Backends, EntityId, EntityKind, EntityUpdate, PendingUpload, VitrineConfig};
//!
//! # async fn example() -> vitrine::VitrineResult<()> {
//! let config = VitrineConfig::load()?;
//! let backends = Backends::from_config(&config)?;
//! let sync = backends.media_sync(&config);
//!
//! let id = EntityId::from(1_i64);
//! let current = backends.records.get_by_id(EntityKind::AboutBanner, &id).await?.media_path();
//! let upload = PendingUpload::new("hero.jpg", std::fs::read("hero.jpg").unwrap())?;
//! let outcome = sync
//!     .replace_media(&id, current.as_ref(), Some(&upload), EntityUpdate::media_only(EntityKind::AboutBanner))
//!     .await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `database` - PostgreSQL record store

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backends;
mod logging;

pub use backends::Backends;
pub use logging::{LogFormat, init_logging};

pub use vitrine_config::*;
pub use vitrine_core::*;
pub use vitrine_error::*;
pub use vitrine_records::{MemoryRecordStore, RecordStore, RestRecordStore};
pub use vitrine_storage::{
    FileSystemStorage, MemoryStorage, ObjectInfo, ObjectStorage, RestStorage, RestStorageConfig,
    UploadReceipt, unique_object_name,
};
pub use vitrine_sync::*;

#[cfg(feature = "database")]
pub use vitrine_database::PgRecordStore;
