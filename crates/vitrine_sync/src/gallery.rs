//! Child image collections: append, remove, reorder.

use crate::cleanup::delete_referenced;
use crate::{OldMediaCleanup, SyncPolicy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use vitrine_core::{
    ContentRecord, EntityId, EntityKind, MediaPath, PendingUpload, RecordPatch, next_sort_index,
};
use vitrine_error::{FailureClass, ValidationError, VitrineResult};
use vitrine_records::RecordStore;
use vitrine_storage::{ObjectStorage, unique_object_name};

/// An image to append to a gallery.
#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    /// The selected file
    pub upload: PendingUpload,
    /// Explicit order value; `None` appends after the current last image
    pub sort: Option<i64>,
}

impl NewGalleryImage {
    /// Append after the current last image.
    pub fn new(upload: PendingUpload) -> Self {
        Self { upload, sort: None }
    }

    /// Use an explicit order value.
    pub fn with_sort(mut self, sort: i64) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Where an append stopped.
#[derive(Debug, Clone, Serialize, derive_getters::Getters)]
pub struct GalleryFailure {
    /// Position of the failed image in the request
    index: usize,
    /// Failure class of the error
    #[serde(serialize_with = "crate::outcome::as_display")]
    class: FailureClass,
    /// Human-readable reason
    message: String,
    /// Key of an uploaded object no row references
    orphaned: Option<String>,
}

/// Result of a gallery append.
///
/// Images are processed in request order and the run stops at the first
/// failure; rows created before it are kept.
#[derive(Debug, Clone, Serialize, derive_getters::Getters)]
pub struct GalleryAppendReport {
    /// Rows created, in request order
    created: Vec<ContentRecord>,
    /// The failure that stopped the run, if any
    failure: Option<GalleryFailure>,
}

impl GalleryAppendReport {
    /// Whether every requested image was appended.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Gallery operations for entities whose images are child rows.
#[derive(Clone)]
pub struct GallerySync {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    policy: SyncPolicy,
}

impl std::fmt::Debug for GallerySync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GallerySync")
            .field("storage", &self.storage.backend_name())
            .field("records", &self.records.backend_name())
            .finish()
    }
}

/// Child kind with its parent and order columns.
fn child_columns(
    parent_kind: EntityKind,
) -> Result<(EntityKind, &'static str, &'static str, &'static str), ValidationError> {
    let no_gallery = || ValidationError::invalid("kind", format!("'{}' has no gallery", parent_kind));
    let child = parent_kind.gallery().ok_or_else(no_gallery)?;
    let parent_field = child.parent_field().ok_or_else(no_gallery)?;
    let order_field = child.order_field().ok_or_else(no_gallery)?;
    let media_field = child.media_field().ok_or_else(no_gallery)?;
    Ok((child, parent_field, order_field, media_field))
}

fn require_order_field(child_kind: EntityKind) -> Result<&'static str, ValidationError> {
    child_kind.order_field().ok_or_else(|| {
        ValidationError::invalid("kind", format!("'{}' is not orderable", child_kind))
    })
}

impl GallerySync {
    /// Create with the default policy.
    pub fn new(storage: Arc<dyn ObjectStorage>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            storage,
            records,
            policy: SyncPolicy::default(),
        }
    }

    /// Use a different policy; only `compensate_orphans` applies here.
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current children of a parent, in display order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the kind has no gallery, or the record
    /// error of the lookup.
    pub async fn images(
        &self,
        parent_kind: EntityKind,
        parent_id: &EntityId,
    ) -> VitrineResult<Vec<ContentRecord>> {
        let (child, parent_field, _, _) = child_columns(parent_kind)?;
        Ok(self
            .records
            .find_by(child, parent_field, &parent_id.to_json())
            .await?)
    }

    /// Upload images and create one child row per image.
    ///
    /// New rows get order values strictly above every existing one unless
    /// the caller gives an explicit value.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the kind has no gallery, or the record
    /// error if the existing rows cannot be read. Failures after that are
    /// reported in the returned [`GalleryAppendReport`].
    #[instrument(skip(self, images), fields(kind = %parent_kind, parent = %parent_id, count = images.len()))]
    pub async fn append(
        &self,
        parent_kind: EntityKind,
        parent_id: &EntityId,
        images: Vec<NewGalleryImage>,
    ) -> VitrineResult<GalleryAppendReport> {
        let (child, parent_field, order_field, media_field) = child_columns(parent_kind)?;
        let existing = self
            .records
            .find_by(child, parent_field, &parent_id.to_json())
            .await?;
        let mut next = next_sort_index(&existing);
        debug!(existing = existing.len(), next, "Appending to gallery");

        let mut created = Vec::with_capacity(images.len());
        for (index, image) in images.into_iter().enumerate() {
            let sort = image.sort.unwrap_or(next);
            next = next.max(sort.saturating_add(1));

            let key = unique_object_name(child.object_prefix(), &image.upload.extension());
            if let Err(e) = self
                .storage
                .upload(&key, image.upload.bytes(), image.upload.content_type())
                .await
            {
                error!(index, error = %e, "Gallery upload failed");
                return Ok(GalleryAppendReport {
                    created,
                    failure: Some(GalleryFailure {
                        index,
                        class: e.kind.class(),
                        message: e.kind.to_string(),
                        orphaned: None,
                    }),
                });
            }

            let media_path = MediaPath::committed(&key, child.path_style(), self.storage.public_base());
            let mut row = RecordPatch::new();
            row.set(parent_field, parent_id.to_json())
                .set(order_field, sort)
                .set_media(media_field, Some(&media_path));

            match self.records.create(child, row).await {
                Ok(record) => {
                    info!(index, sort, media_path = %media_path, "Gallery image added");
                    created.push(record);
                }
                Err(e) => {
                    error!(index, error = %e, "Gallery row insert failed");
                    let orphaned = self.handle_orphan(key).await;
                    return Ok(GalleryAppendReport {
                        created,
                        failure: Some(GalleryFailure {
                            index,
                            class: e.kind.class(),
                            message: e.kind.to_string(),
                            orphaned,
                        }),
                    });
                }
            }
        }

        Ok(GalleryAppendReport {
            created,
            failure: None,
        })
    }

    async fn handle_orphan(&self, key: String) -> Option<String> {
        if !self.policy.compensate_orphans() {
            warn!(key, "Uploaded gallery object is now unreferenced");
            return Some(key);
        }
        match self.storage.delete(&key).await {
            Ok(()) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to remove unreferenced gallery object");
                Some(key)
            }
        }
    }

    /// Delete one child row and, best-effort, its object.
    ///
    /// # Errors
    ///
    /// Returns the record error if the row cannot be read or deleted.
    #[instrument(skip(self), fields(kind = %child_kind, id = %row_id))]
    pub async fn remove(
        &self,
        child_kind: EntityKind,
        row_id: &EntityId,
    ) -> VitrineResult<OldMediaCleanup> {
        let row = self.records.get_by_id(child_kind, row_id).await?;
        let cleanup = delete_referenced(self.storage.as_ref(), row.media_path().as_ref()).await;
        self.records.delete(child_kind, row_id).await?;
        info!("Gallery image removed");
        Ok(cleanup)
    }

    /// Write new order values, one update per row.
    ///
    /// Rows are written in the given order with no locking; a later writer
    /// of the same row wins.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the kind is not orderable, or the first
    /// record error. Rows written before the failure keep their new value.
    #[instrument(skip(self, orders), fields(kind = %child_kind, rows = orders.len()))]
    pub async fn reorder(
        &self,
        child_kind: EntityKind,
        orders: &[(EntityId, i64)],
    ) -> VitrineResult<Vec<ContentRecord>> {
        let order_field = require_order_field(child_kind)?;
        let mut updated = Vec::with_capacity(orders.len());
        for (id, sort) in orders {
            let mut patch = RecordPatch::new();
            patch.set(order_field, *sort);
            updated.push(self.records.update(child_kind, id, patch).await?);
        }
        info!("Order updated");
        Ok(updated)
    }
}
