//! Record store error types.

use crate::FailureClass;

/// Kinds of record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RecordErrorKind {
    /// Network or connectivity failure talking to the record API
    #[display("Record store transport failure: {}", _0)]
    Transport(String),
    /// No row with this id in the table
    #[display("Record {} not found in '{}'", id, table)]
    NotFound {
        /// Table that was queried
        table: String,
        /// Id that was looked up
        id: String,
    },
    /// A unique constraint rejected the write
    #[display("Record conflict: {}", _0)]
    Conflict(String),
    /// The record API answered with an unexpected status
    #[display("Record API returned {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// A row could not be decoded or a patch could not be encoded
    #[display("Record serialization error: {}", _0)]
    Serialization(String),
    /// The query could not be built (bad table or column name)
    #[display("Invalid record query: {}", _0)]
    InvalidQuery(String),
}

impl RecordErrorKind {
    /// Classify this record failure.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Transport(_) => FailureClass::Transport,
            Self::NotFound { .. } => FailureClass::NotFound,
            Self::Conflict(_) => FailureClass::Conflict,
            Self::InvalidQuery(_) => FailureClass::Validation,
            Self::Api { .. } | Self::Serialization(_) => FailureClass::Internal,
        }
    }
}

/// Record store error with location tracking.
///
/// # Examples
///
/// ```
/// use vitrine_error::{RecordError, RecordErrorKind};
///
/// let err = RecordError::new(RecordErrorKind::NotFound {
///     table: "projects".to_string(),
///     id: "42".to_string(),
/// });
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Record Error: {} at line {} in {}", kind, line, file)]
pub struct RecordError {
    /// The kind of error that occurred
    pub kind: RecordErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RecordError {
    /// Create a new record error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RecordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing row.
    #[track_caller]
    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(RecordErrorKind::NotFound {
            table: table.into(),
            id: id.into(),
        })
    }
}
