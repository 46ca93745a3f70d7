//! Storage error types.

use crate::FailureClass;

/// Kinds of object storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Network or connectivity failure talking to the storage API
    #[display("Storage transport failure: {}", _0)]
    Transport(String),
    /// Object not found at the specified path
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// An object already exists at the target path
    #[display("Object already exists: {}", _0)]
    Conflict(String),
    /// Invalid object path
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write object
    #[display("Failed to write object: {}", _0)]
    FileWrite(String),
    /// Failed to read object
    #[display("Failed to read object: {}", _0)]
    FileRead(String),
    /// Permission denied by the storage backend
    #[display("Permission denied: {}", _0)]
    PermissionDenied(String),
    /// The storage API answered with an unexpected status
    #[display("Storage API returned {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
}

impl StorageErrorKind {
    /// Classify this storage failure.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Transport(_) => FailureClass::Transport,
            Self::NotFound(_) => FailureClass::NotFound,
            Self::Conflict(_) => FailureClass::Conflict,
            Self::InvalidPath(_) => FailureClass::Validation,
            Self::DirectoryCreation(_)
            | Self::FileWrite(_)
            | Self::FileRead(_)
            | Self::PermissionDenied(_)
            | Self::Api { .. } => FailureClass::Internal,
        }
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use vitrine_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("old.jpg".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the object was simply missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}
