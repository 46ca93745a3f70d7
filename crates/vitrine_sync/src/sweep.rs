//! Removal of abandoned temp objects.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use vitrine_error::{ValidationError, VitrineResult};
use vitrine_storage::ObjectStorage;

/// What a sweep did.
#[derive(Debug, Clone, Default, Serialize, derive_getters::Getters)]
pub struct SweepReport {
    /// Keys deleted
    deleted: Vec<String>,
    /// `(key, reason)` pairs that could not be deleted
    failed: Vec<(String, String)>,
    /// Number of temp objects that were too recent or carry no timestamp
    kept: usize,
}

/// Deletes temp objects older than a cutoff.
///
/// Drafts that were abandoned before saving leave their inline images in the
/// temp namespace; nothing else ever removes them. Sweeps run only when
/// invoked explicitly.
#[derive(Clone)]
pub struct TempSweeper {
    storage: Arc<dyn ObjectStorage>,
    temp_prefix: String,
}

impl std::fmt::Debug for TempSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempSweeper")
            .field("storage", &self.storage.backend_name())
            .field("temp_prefix", &self.temp_prefix)
            .finish()
    }
}

impl TempSweeper {
    /// Create a sweeper for a temp namespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the prefix is blank; sweeping the whole
    /// bucket is never allowed.
    pub fn new(storage: Arc<dyn ObjectStorage>, temp_prefix: &str) -> VitrineResult<Self> {
        let prefix = temp_prefix.trim_matches('/');
        if prefix.is_empty() {
            return Err(ValidationError::missing("temp_prefix").into());
        }
        Ok(Self {
            storage,
            temp_prefix: format!("{}/", prefix),
        })
    }

    /// Delete every temp object last modified before `now - max_age`.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the namespace cannot be listed. Failed
    /// deletes are reported, not returned.
    #[instrument(skip(self), fields(prefix = %self.temp_prefix))]
    pub async fn sweep(&self, max_age: Duration, now: DateTime<Utc>) -> VitrineResult<SweepReport> {
        let cutoff = now - max_age;
        let mut report = SweepReport::default();

        for object in self.storage.list(&self.temp_prefix).await? {
            let stale = object.last_modified().is_some_and(|t| t < cutoff);
            if !stale {
                report.kept += 1;
                continue;
            }
            match self.storage.delete(object.path()).await {
                Ok(()) => report.deleted.push(object.path().clone()),
                Err(e) if e.is_not_found() => report.deleted.push(object.path().clone()),
                Err(e) => {
                    warn!(key = %object.path(), error = %e, "Failed to delete temp object");
                    report.failed.push((object.path().clone(), e.kind.to_string()));
                }
            }
        }

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            kept = report.kept,
            "Temp sweep finished"
        );
        Ok(report)
    }
}
