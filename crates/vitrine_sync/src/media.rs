//! Replace, remove and cascade-delete of entity media.

use crate::cleanup::delete_referenced;
use crate::{GallerySync, MediaFormState, OldMediaCleanup, SyncOutcome, SyncPolicy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use vitrine_config::CleanupOrder;
use vitrine_core::{
    ContentRecord, EntityId, EntityKind, EntityUpdate, MediaPath, PendingUpload, RecordPatch,
};
use vitrine_error::{ValidationError, ValidationErrorKind, VitrineResult};
use vitrine_records::RecordStore;
use vitrine_storage::{ObjectStorage, unique_object_name};

/// What an entity deletion removed.
#[derive(Debug, Clone, Serialize, derive_getters::Getters)]
pub struct DeletionReport {
    /// Cleanup of the entity's own media and every child row's media
    media: Vec<OldMediaCleanup>,
    /// Number of child rows deleted
    child_rows_deleted: usize,
}

/// Runs media workflows against one storage backend and one record store.
#[derive(Clone)]
pub struct MediaSync {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    policy: SyncPolicy,
}

impl std::fmt::Debug for MediaSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSync")
            .field("storage", &self.storage.backend_name())
            .field("records", &self.records.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}

fn media_field(kind: EntityKind) -> Result<&'static str, ValidationError> {
    kind.media_field().ok_or_else(|| {
        ValidationError::new(ValidationErrorKind::NoMediaField(kind.to_string()))
    })
}

impl MediaSync {
    /// Create with the default policy.
    pub fn new(storage: Arc<dyn ObjectStorage>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            storage,
            records,
            policy: SyncPolicy::default(),
        }
    }

    /// Use a different replace policy.
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Storage backend.
    pub fn storage(&self) -> &Arc<dyn ObjectStorage> {
        &self.storage
    }

    /// Record store.
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    /// Active policy.
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    /// Gallery operations over the same backends and policy.
    pub fn gallery(&self) -> GallerySync {
        GallerySync::new(Arc::clone(&self.storage), Arc::clone(&self.records))
            .with_policy(self.policy)
    }

    /// Committed reference for a freshly uploaded key, in the kind's style.
    pub fn committed_path(&self, kind: EntityKind, key: &str) -> MediaPath {
        MediaPath::committed(key, kind.path_style(), self.storage.public_base())
    }

    /// Replace an entity's media and write its other changed fields.
    ///
    /// `current` is the reference the record holds now; `upload` is the newly
    /// selected file, if any. The entity kind is taken from `update`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, before any backend call, if the update is
    /// invalid or a file is given for a kind without media. Every later
    /// failure is reported in the returned [`SyncOutcome`].
    #[instrument(
        skip(self, current, upload, update),
        fields(kind = %update.kind(), id = %id, has_upload = upload.is_some())
    )]
    pub async fn replace_media(
        &self,
        id: &EntityId,
        current: Option<&MediaPath>,
        upload: Option<&PendingUpload>,
        update: EntityUpdate,
    ) -> VitrineResult<SyncOutcome> {
        let kind = *update.kind();
        let field = match upload {
            Some(_) => Some(media_field(kind)?),
            None => None,
        };
        let patch = update.into_patch()?;

        let (Some(upload), Some(field)) = (upload, field) else {
            return Ok(self.write_fields(kind, id, current, patch).await);
        };

        let outcome = match self.policy.cleanup_order() {
            CleanupOrder::DeleteFirst => {
                self.replace_delete_first(kind, id, current, upload, field, patch)
                    .await
            }
            CleanupOrder::UploadFirst => {
                self.replace_upload_first(kind, id, current, upload, field, patch)
                    .await
            }
        };
        Ok(outcome)
    }

    /// No new file: write only the other fields, or nothing at all.
    async fn write_fields(
        &self,
        kind: EntityKind,
        id: &EntityId,
        current: Option<&MediaPath>,
        patch: RecordPatch,
    ) -> SyncOutcome {
        if patch.is_empty() {
            debug!("No file selected and no field changed, skipping");
            return SyncOutcome::Unchanged {
                media_path: current.cloned(),
            };
        }

        match self.records.update(kind, id, patch).await {
            Ok(record) => {
                info!("Record updated, media unchanged");
                SyncOutcome::Committed {
                    record,
                    media_path: current.cloned(),
                    old_media_cleanup: OldMediaCleanup::NotNeeded,
                }
            }
            Err(error) => {
                error!(error = %error, "Record update failed");
                SyncOutcome::UpdateFailed {
                    error,
                    orphaned: None,
                    old_media_cleanup: OldMediaCleanup::NotNeeded,
                }
            }
        }
    }

    async fn upload_new(
        &self,
        kind: EntityKind,
        upload: &PendingUpload,
    ) -> Result<String, vitrine_error::StorageError> {
        let key = unique_object_name(kind.object_prefix(), &upload.extension());
        debug!(key, "Uploading new object");
        self.storage
            .upload(&key, upload.bytes(), upload.content_type())
            .await?;
        Ok(key)
    }

    /// Remove the just-uploaded object when the policy asks for it.
    ///
    /// Returns the key if the object is left orphaned.
    async fn handle_orphan(&self, key: String) -> Option<String> {
        if !self.policy.compensate_orphans() {
            warn!(key, "Uploaded object is now unreferenced");
            return Some(key);
        }
        match self.storage.delete(&key).await {
            Ok(()) => {
                info!(key, "Removed unreferenced upload");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to remove unreferenced upload");
                Some(key)
            }
        }
    }

    async fn replace_delete_first(
        &self,
        kind: EntityKind,
        id: &EntityId,
        current: Option<&MediaPath>,
        upload: &PendingUpload,
        field: &str,
        mut patch: RecordPatch,
    ) -> SyncOutcome {
        let cleanup = delete_referenced(self.storage.as_ref(), current).await;

        let key = match self.upload_new(kind, upload).await {
            Ok(key) => key,
            Err(error) => {
                error!(error = %error, "Upload failed, record left unchanged");
                return SyncOutcome::UploadFailed {
                    error,
                    old_media_deleted: cleanup.removed(),
                };
            }
        };

        let media_path = self.committed_path(kind, &key);
        patch.set_media(field, Some(&media_path));

        match self.records.update(kind, id, patch).await {
            Ok(record) => {
                info!(media_path = %media_path, "Media replaced");
                SyncOutcome::Committed {
                    record,
                    media_path: Some(media_path),
                    old_media_cleanup: cleanup,
                }
            }
            Err(error) => {
                error!(error = %error, "Record update failed after upload");
                SyncOutcome::UpdateFailed {
                    error,
                    orphaned: self.handle_orphan(key).await,
                    old_media_cleanup: cleanup,
                }
            }
        }
    }

    async fn replace_upload_first(
        &self,
        kind: EntityKind,
        id: &EntityId,
        current: Option<&MediaPath>,
        upload: &PendingUpload,
        field: &str,
        mut patch: RecordPatch,
    ) -> SyncOutcome {
        let key = match self.upload_new(kind, upload).await {
            Ok(key) => key,
            Err(error) => {
                error!(error = %error, "Upload failed, record and previous object untouched");
                return SyncOutcome::UploadFailed {
                    error,
                    old_media_deleted: false,
                };
            }
        };

        let media_path = self.committed_path(kind, &key);
        patch.set_media(field, Some(&media_path));

        let record = match self.records.update(kind, id, patch).await {
            Ok(record) => record,
            Err(error) => {
                error!(error = %error, "Record update failed after upload");
                return SyncOutcome::UpdateFailed {
                    error,
                    orphaned: self.handle_orphan(key).await,
                    old_media_cleanup: OldMediaCleanup::NotNeeded,
                };
            }
        };

        let cleanup = delete_referenced(self.storage.as_ref(), current).await;
        info!(media_path = %media_path, "Media replaced");
        SyncOutcome::Committed {
            record,
            media_path: Some(media_path),
            old_media_cleanup: cleanup,
        }
    }

    /// Remove an entity's media: delete the object (best-effort), then clear
    /// the reference. The record update always runs.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the kind has no media column.
    #[instrument(skip(self, current), fields(kind = %kind, id = %id))]
    pub async fn remove_media(
        &self,
        kind: EntityKind,
        id: &EntityId,
        current: Option<&MediaPath>,
    ) -> VitrineResult<SyncOutcome> {
        let field = media_field(kind)?;
        let cleanup = delete_referenced(self.storage.as_ref(), current).await;

        let mut patch = RecordPatch::new();
        patch.set_media(field, None);

        Ok(match self.records.update(kind, id, patch).await {
            Ok(record) => {
                info!("Media removed");
                SyncOutcome::Committed {
                    record,
                    media_path: None,
                    old_media_cleanup: cleanup,
                }
            }
            Err(error) => {
                error!(error = %error, "Failed to clear media reference");
                SyncOutcome::UpdateFailed {
                    error,
                    orphaned: None,
                    old_media_cleanup: cleanup,
                }
            }
        })
    }

    /// Run a form submission: guard against double submits, replace, and
    /// apply the outcome to the form.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form is already submitting or the
    /// update is invalid; the form is released again in both cases.
    pub async fn submit(
        &self,
        form: &mut MediaFormState,
        id: &EntityId,
        update: EntityUpdate,
    ) -> VitrineResult<SyncOutcome> {
        form.begin_submit()?;
        let result = self
            .replace_media(id, form.committed(), form.pending(), update)
            .await;
        match &result {
            Ok(outcome) => form.apply(outcome),
            Err(_) => form.abort_submit(),
        }
        result
    }

    /// Delete an entity with its media and gallery rows.
    ///
    /// Media deletes are best-effort. Child rows are deleted before the
    /// entity row; a failed row delete stops the cascade.
    ///
    /// # Errors
    ///
    /// Returns the record error of the first row that could not be read or
    /// deleted.
    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    pub async fn delete_entity(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> VitrineResult<DeletionReport> {
        let storage = self.storage.as_ref();
        let record = self.records.get_by_id(kind, id).await?;
        let mut media = vec![delete_referenced(storage, record.media_path().as_ref()).await];

        let children = self.gallery_children(kind, id).await?;
        for child in &children {
            media.push(delete_referenced(storage, child.media_path().as_ref()).await);
        }
        for child in &children {
            self.records.delete(*child.kind(), child.id()).await?;
        }

        self.records.delete(kind, id).await?;
        info!(children = children.len(), "Entity deleted");

        Ok(DeletionReport {
            media,
            child_rows_deleted: children.len(),
        })
    }

    async fn gallery_children(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> VitrineResult<Vec<ContentRecord>> {
        let Some(child) = kind.gallery() else {
            return Ok(Vec::new());
        };
        let Some(parent_field) = child.parent_field() else {
            return Ok(Vec::new());
        };
        Ok(self
            .records
            .find_by(child, parent_field, &id.to_json())
            .await?)
    }
}
