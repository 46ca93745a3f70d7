//! Per-form media state: the committed reference, the pending selection with
//! its preview, and the advisory busy flag.

use crate::SyncOutcome;
use std::sync::Arc;
use tracing::debug;
use vitrine_core::{MediaPath, PendingUpload, PreviewRegistry, PreviewUrl, PublicUrlBase};
use vitrine_error::ValidationError;

/// State behind one media field of an edit form.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vitrine_core::{PendingUpload, PreviewRegistry};
/// use vitrine_sync::MediaFormState;
///
/// let previews = Arc::new(PreviewRegistry::new());
/// let mut form = MediaFormState::new(Arc::clone(&previews), None);
/// form.select_file(PendingUpload::new("a.png", vec![1]).unwrap());
/// form.select_file(PendingUpload::new("b.png", vec![2]).unwrap());
/// assert_eq!(previews.live_count(), 1);
/// form.cancel();
/// assert_eq!(previews.live_count(), 0);
/// ```
#[derive(Debug)]
pub struct MediaFormState {
    committed: Option<MediaPath>,
    pending: Option<PendingUpload>,
    busy: bool,
    last_error: Option<String>,
    previews: Arc<PreviewRegistry>,
}

impl MediaFormState {
    /// Start from the reference the record currently holds.
    pub fn new(previews: Arc<PreviewRegistry>, committed: Option<MediaPath>) -> Self {
        Self {
            committed,
            pending: None,
            busy: false,
            last_error: None,
            previews,
        }
    }

    /// Reference the record holds, as last confirmed.
    pub fn committed(&self) -> Option<&MediaPath> {
        self.committed.as_ref()
    }

    /// File selected but not yet saved.
    pub fn pending(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    /// Whether a submission is running.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Message of the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Preview of the pending file.
    pub fn preview_url(&self) -> Option<&PreviewUrl> {
        self.pending.as_ref().and_then(|u| u.preview().as_ref())
    }

    /// What the form should show: the pending preview, else the committed media.
    pub fn display_url(&self, base: &PublicUrlBase) -> Option<String> {
        match self.preview_url() {
            Some(preview) => Some(preview.to_string()),
            None => self.committed.as_ref().map(|p| p.public_url(base)),
        }
    }

    fn release_pending(&mut self) {
        if let Some(preview) = self.pending.take().and_then(|mut u| u.take_preview()) {
            self.previews.release(&preview);
        }
    }

    /// Select a file, replacing (and releasing) any earlier selection.
    pub fn select_file(&mut self, upload: PendingUpload) -> PreviewUrl {
        self.release_pending();
        let preview = self.previews.create();
        debug!(file = %upload.file_name(), preview = %preview, "File selected");
        self.pending = Some(upload.with_preview(preview.clone()));
        preview
    }

    /// Drop the selection.
    pub fn cancel(&mut self) {
        self.release_pending();
    }

    /// Mark the form busy.
    ///
    /// # Errors
    ///
    /// Returns a validation error while another submission is running.
    pub fn begin_submit(&mut self) -> Result<(), ValidationError> {
        if self.busy {
            return Err(ValidationError::invalid(
                "form",
                "a submission is already in progress",
            ));
        }
        self.busy = true;
        self.last_error = None;
        Ok(())
    }

    /// Release the busy flag without applying an outcome.
    pub fn abort_submit(&mut self) {
        self.busy = false;
    }

    /// Reflect a finished run.
    ///
    /// On success the committed reference is updated and the selection is
    /// cleared; on failure the selection is kept so the editor can retry.
    pub fn apply(&mut self, outcome: &SyncOutcome) {
        self.busy = false;
        match outcome {
            SyncOutcome::Committed { media_path, .. } => {
                self.committed = media_path.clone();
                self.last_error = None;
                self.release_pending();
            }
            SyncOutcome::Unchanged { .. } => {
                self.last_error = None;
                self.release_pending();
            }
            SyncOutcome::UploadFailed { .. } | SyncOutcome::UpdateFailed { .. } => {
                self.last_error = Some(outcome.message());
            }
        }
    }
}

impl Drop for MediaFormState {
    fn drop(&mut self) {
        self.release_pending();
    }
}
