//! Replace ordering and compensation policy.

use vitrine_config::{CleanupOrder, SyncConfig};

/// How a media replace orders its steps and handles a failed record update.
///
/// # Examples
///
/// ```
/// use vitrine_config::CleanupOrder;
/// use vitrine_sync::SyncPolicyBuilder;
///
/// let policy = SyncPolicyBuilder::default()
///     .cleanup_order(CleanupOrder::UploadFirst)
///     .compensate_orphans(true)
///     .build()
///     .unwrap();
/// assert!(*policy.compensate_orphans());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(default)]
pub struct SyncPolicy {
    /// When the previous object is removed
    cleanup_order: CleanupOrder,
    /// Delete the new object again when the record update fails
    compensate_orphans: bool,
}

impl From<&SyncConfig> for SyncPolicy {
    fn from(config: &SyncConfig) -> Self {
        Self {
            cleanup_order: config.cleanup_order,
            compensate_orphans: config.compensate_orphans,
        }
    }
}
