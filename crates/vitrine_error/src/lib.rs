//! Error types for the Vitrine workspace.
//!
//! This crate provides the foundation error types used by every other Vitrine crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Every error can be classified into a [`FailureClass`], which is what callers
//! use to decide how a failure is presented (transport problem, missing record,
//! path collision, invalid input).
//!
//! # Examples
//!
//! ```
//! use vitrine_error::{FailureClass, StorageError, StorageErrorKind, VitrineResult};
//!
//! fn upload() -> VitrineResult<()> {
//!     Err(StorageError::new(StorageErrorKind::Conflict("logo.png".to_string())))?
//! }
//!
//! let err = upload().unwrap_err();
//! assert_eq!(err.class(), FailureClass::Conflict);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod class;
mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod http;
mod json;
mod record;
mod storage;
mod validation;

pub use class::FailureClass;
pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{VitrineError, VitrineErrorKind, VitrineResult};
pub use http::HttpError;
pub use json::JsonError;
pub use record::{RecordError, RecordErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
