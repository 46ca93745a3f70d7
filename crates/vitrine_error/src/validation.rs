//! Validation error types.

/// Input validation failures, raised before any backend is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A required field is missing or blank
    #[display("Required field '{}' is missing", _0)]
    MissingField(String),
    /// A field has a value outside its allowed domain
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidValue {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
    /// The update targets an entity kind it does not belong to
    #[display("Update for '{}' cannot be applied to '{}'", expected, actual)]
    KindMismatch {
        /// Entity kind the update was built for
        expected: String,
        /// Entity kind it was dispatched to
        actual: String,
    },
    /// The entity kind has no media column
    #[display("Entity kind '{}' does not carry media", _0)]
    NoMediaField(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use vitrine_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingField("slug".to_string()));
/// assert!(format!("{}", err).contains("slug"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing required field.
    #[track_caller]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingField(field.into()))
    }

    /// Shorthand for an out-of-domain value.
    #[track_caller]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        })
    }
}
