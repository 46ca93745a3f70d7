//! Best-effort removal of objects a record no longer needs.

use crate::OldMediaCleanup;
use tracing::{info, warn};
use vitrine_core::MediaPath;
use vitrine_storage::ObjectStorage;

/// Delete the object behind a stored reference.
///
/// Never fails: external references are skipped, and a missing object or a
/// failed delete is logged and reported.
pub(crate) async fn delete_referenced(
    storage: &dyn ObjectStorage,
    current: Option<&MediaPath>,
) -> OldMediaCleanup {
    let Some(path) = current else {
        return OldMediaCleanup::NotNeeded;
    };

    let Some(key) = path.object_key(storage.public_base().bucket()) else {
        info!(path = %path, "Leaving external media in place");
        return OldMediaCleanup::SkippedExternal { path: path.clone() };
    };

    match storage.delete(&key).await {
        Ok(()) => {
            info!(key, "Removed previous object");
            OldMediaCleanup::Deleted { key }
        }
        Err(e) if e.is_not_found() => {
            warn!(key, "Previous object was already missing");
            OldMediaCleanup::AlreadyMissing { key }
        }
        Err(error) => {
            warn!(key, error = %error, "Failed to remove previous object, continuing");
            OldMediaCleanup::Failed { key, error }
        }
    }
}
