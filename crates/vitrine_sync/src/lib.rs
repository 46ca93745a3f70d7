//! Upload-and-record sync workflows.
//!
//! Every content screen of the admin dashboard follows the same chain when a
//! form with a media field is submitted: remove the previous object, upload the
//! new one, write its path to the record, and reflect the committed path back
//! into the form. [`MediaSync`] implements that chain once, over the
//! [`ObjectStorage`](vitrine_storage::ObjectStorage) and
//! [`RecordStore`](vitrine_records::RecordStore) seams.
//!
//! The two backends cannot share a transaction, so consistency is best-effort:
//! each step's failure policy is fixed, and every run returns a
//! [`SyncOutcome`] saying exactly what was committed, what was cleaned up and
//! what may have been left behind.
//!
//! Also here:
//! - [`GallerySync`]: child image rows (append, remove, reorder)
//! - [`TempMediaPromoter`]: inline images of rich-text drafts
//! - [`TempSweeper`]: removal of abandoned temp objects
//! - [`MediaFormState`]: the per-form selection, preview and busy state
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_core::{EntityKind, EntityUpdate, PendingUpload};
//! use vitrine_records::{MemoryRecordStore, RecordStore};
//! use vitrine_storage::MemoryStorage;
//! use vitrine_sync::{MediaSync, SyncOutcome};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let records = Arc::new(MemoryRecordStore::new());
//! let banner = records.seed(EntityKind::AboutBanner, serde_json::json!({"id": 1}))?;
//! let sync = MediaSync::new(Arc::new(MemoryStorage::new("uploads")), records);
//!
//! let upload = PendingUpload::new("hero.jpg", vec![1, 2, 3])?;
//! let outcome = sync
//!     .replace_media(banner.id(), None, Some(&upload), EntityUpdate::media_only(EntityKind::AboutBanner))
//!     .await?;
//! assert!(matches!(outcome, SyncOutcome::Committed { .. }));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cleanup;
mod form;
mod gallery;
mod media;
mod outcome;
mod policy;
mod promote;
mod sweep;

pub use form::MediaFormState;
pub use gallery::{GalleryAppendReport, GalleryFailure, GallerySync, NewGalleryImage};
pub use media::{DeletionReport, MediaSync};
pub use outcome::{OldMediaCleanup, SyncOutcome};
pub use policy::{SyncPolicy, SyncPolicyBuilder};
pub use promote::{InlineImage, PromotionReport, TempMediaPromoter};
pub use sweep::{SweepReport, TempSweeper};
