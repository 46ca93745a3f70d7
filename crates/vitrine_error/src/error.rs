//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{
    ConfigError, FailureClass, HttpError, JsonError, RecordError, StorageError, ValidationError,
};

/// The union of every error a Vitrine operation can produce.
///
/// # Examples
///
/// ```
/// use vitrine_error::{HttpError, VitrineError};
///
/// let http_err = HttpError::new("bad base url");
/// let err: VitrineError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VitrineErrorKind {
    /// Object storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Record store error
    #[from(RecordError)]
    Record(RecordError),
    /// Input validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP client error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Direct database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Vitrine error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vitrine_error::{ConfigError, VitrineResult};
///
/// fn might_fail() -> VitrineResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vitrine Error: {}", _0)]
pub struct VitrineError(Box<VitrineErrorKind>);

impl VitrineError {
    /// Create a new error from a kind.
    pub fn new(kind: VitrineErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VitrineErrorKind {
        &self.0
    }

    /// Classify the error for presentation.
    pub fn class(&self) -> FailureClass {
        match self.kind() {
            VitrineErrorKind::Storage(e) => e.kind.class(),
            VitrineErrorKind::Record(e) => e.kind.class(),
            VitrineErrorKind::Validation(_) => FailureClass::Validation,
            VitrineErrorKind::Config(_) => FailureClass::Config,
            VitrineErrorKind::Http(_) | VitrineErrorKind::Json(_) => FailureClass::Internal,
            #[cfg(feature = "database")]
            VitrineErrorKind::Database(e) => e.kind.class(),
        }
    }
}

// Generic From implementation for any type that converts to VitrineErrorKind
impl<T> From<T> for VitrineError
where
    T: Into<VitrineErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vitrine operations.
pub type VitrineResult<T> = std::result::Result<T, VitrineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordErrorKind, StorageErrorKind};

    #[test]
    fn class_follows_the_wrapped_kind() {
        let err: VitrineError =
            StorageError::new(StorageErrorKind::Conflict("a.jpg".to_string())).into();
        assert_eq!(err.class(), FailureClass::Conflict);

        let err: VitrineError = RecordError::not_found("projects", "9").into();
        assert_eq!(err.class(), FailureClass::NotFound);

        let err: VitrineError =
            RecordError::new(RecordErrorKind::Transport("reset".to_string())).into();
        assert_eq!(err.class(), FailureClass::Transport);

        let err: VitrineError = ValidationError::missing("title").into();
        assert_eq!(err.class(), FailureClass::Validation);

        let err: VitrineError = ConfigError::new("no api key").into();
        assert_eq!(err.class(), FailureClass::Config);
    }

    #[test]
    fn location_points_at_the_caller() {
        let err = StorageError::new(StorageErrorKind::Transport("x".to_string()));
        assert!(err.file.ends_with("error.rs"));
        assert!(err.line > 0);
    }
}
