//! Core data types for the Vitrine media-sync toolkit.
//!
//! This crate describes the content entities edited through the admin dashboard,
//! the media paths they reference, the typed partial updates that may be sent to
//! the record store, and the pure list helpers (display ordering, search, paging)
//! that every list screen shares.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod media_path;
mod ordering;
mod patch;
mod record;
mod update;
mod upload;

pub use entity::{EntityId, EntityKind, PathStyle};
pub use media_path::{MediaPath, PublicUrlBase};
pub use ordering::{
    PageButton, Paged, SortDirection, filter_by_title, next_sort_index, page_window, paginate,
    sort_by_created, sort_for_display,
};
pub use patch::RecordPatch;
pub use record::ContentRecord;
pub use update::{
    BannerUpdate, ContactUpdate, EntityUpdate, HeaderUpdate, ImageItemUpdate, LinkItem,
    MenuItem, NewsUpdate, ProjectUpdate, UpdateFields, slugify,
};
pub use upload::{PendingUpload, PreviewRegistry, PreviewUrl};
