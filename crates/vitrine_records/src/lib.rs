//! Record stores for content entities.
//!
//! One table per [`EntityKind`](vitrine_core::EntityKind); rows come back as
//! [`ContentRecord`](vitrine_core::ContentRecord)s and are changed with
//! [`RecordPatch`](vitrine_core::RecordPatch)es.
//!
//! # Backends
//!
//! - [`RestRecordStore`]: PostgREST over HTTP
//! - [`MemoryRecordStore`]: process-local, for dry runs and tests
//!
//! The direct PostgreSQL store lives in `vitrine_database`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod query;
mod rest;
mod store;

pub use memory::MemoryRecordStore;
pub use query::{filter_literal, validate_identifier};
pub use rest::RestRecordStore;
pub use store::RecordStore;
pub use vitrine_error::{RecordError, RecordErrorKind};
