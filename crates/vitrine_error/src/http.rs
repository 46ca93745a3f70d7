//! HTTP client error types.

/// HTTP error for failures building or configuring a client, with source location.
///
/// Request failures against a backend are reported through [`crate::StorageError`]
/// or [`crate::RecordError`] so they carry the backend's taxonomy; this type covers
/// the client itself (invalid header values, TLS setup, bad base URLs).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use vitrine_error::HttpError;
    ///
    /// let err = HttpError::new("invalid header value");
    /// assert!(err.message.contains("invalid header"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
