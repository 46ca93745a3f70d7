//! Results of sync runs.

use serde::Serialize;
use vitrine_core::{ContentRecord, MediaPath};
use vitrine_error::{FailureClass, RecordError, StorageError};

/// What happened to the object a record referenced before the run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OldMediaCleanup {
    /// There was nothing to remove
    NotNeeded,
    /// The reference points at media hosted elsewhere; it is never deleted
    SkippedExternal {
        /// The external reference
        path: MediaPath,
    },
    /// The object was deleted
    Deleted {
        /// Bucket key that was removed
        key: String,
    },
    /// The object was already gone
    AlreadyMissing {
        /// Bucket key that was missing
        key: String,
    },
    /// The delete failed; the object may still exist unreferenced
    Failed {
        /// Bucket key that could not be removed
        key: String,
        /// Why the delete failed
        #[serde(serialize_with = "as_display")]
        error: StorageError,
    },
}

impl OldMediaCleanup {
    /// Whether the old object is known to be gone.
    pub fn removed(&self) -> bool {
        matches!(self, Self::Deleted { .. } | Self::AlreadyMissing { .. })
    }
}

pub(crate) fn as_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}

/// Result of a media sync run.
///
/// Validation failures are returned as errors before any backend is touched;
/// everything that happens after the first backend call is reported here.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The record now holds the new state.
    Committed {
        /// The row as returned by the record store
        record: ContentRecord,
        /// The committed media reference (`None` when media was removed)
        media_path: Option<MediaPath>,
        /// What happened to the previous object
        old_media_cleanup: OldMediaCleanup,
    },
    /// Nothing was selected and nothing changed; no call was made.
    Unchanged {
        /// The reference the record still holds
        media_path: Option<MediaPath>,
    },
    /// The upload failed; the record was not touched.
    UploadFailed {
        /// Why the upload failed
        #[serde(serialize_with = "as_display")]
        error: StorageError,
        /// Whether the old object had already been deleted, leaving the
        /// record pointing at a missing object
        old_media_deleted: bool,
    },
    /// The record update failed after the upload succeeded.
    UpdateFailed {
        /// Why the update failed
        #[serde(serialize_with = "as_display")]
        error: RecordError,
        /// Key of the uploaded object nothing references, if it was kept
        orphaned: Option<String>,
        /// What happened to the previous object
        old_media_cleanup: OldMediaCleanup,
    },
}

impl SyncOutcome {
    /// Whether the run reached the record store successfully (or had nothing to do).
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Unchanged { .. })
    }

    /// Media reference the record holds after the run, when known.
    pub fn media_path(&self) -> Option<&MediaPath> {
        match self {
            Self::Committed { media_path, .. } | Self::Unchanged { media_path } => {
                media_path.as_ref()
            }
            _ => None,
        }
    }

    /// Failure class, for failed runs.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Self::UploadFailed { error, .. } => Some(error.kind.class()),
            Self::UpdateFailed { error, .. } => Some(error.kind.class()),
            _ => None,
        }
    }

    /// Message suitable for showing to an editor.
    pub fn message(&self) -> String {
        match self {
            Self::Committed { .. } => "Saved".to_string(),
            Self::Unchanged { .. } => "No changes".to_string(),
            Self::UploadFailed {
                error,
                old_media_deleted: true,
            } => format!(
                "Upload failed: {}. The previous image had already been removed",
                error.kind
            ),
            Self::UploadFailed { error, .. } => format!("Upload failed: {}", error.kind),
            Self::UpdateFailed { error, .. } => format!("Saving failed: {}", error.kind),
        }
    }
}
