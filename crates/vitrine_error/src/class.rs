//! Coarse failure classification.

/// How a failure should be understood by the code presenting it.
///
/// Storage and record backends report many specific conditions; callers only
/// need to know which of these buckets a failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FailureClass {
    /// Network or connectivity failure talking to a backend.
    #[display("transport")]
    Transport,
    /// The record or object does not exist.
    #[display("not found")]
    NotFound,
    /// The target path or row already exists.
    #[display("conflict")]
    Conflict,
    /// Input rejected before any backend call was made.
    #[display("validation")]
    Validation,
    /// Missing or malformed configuration.
    #[display("configuration")]
    Config,
    /// Anything else (unexpected API status, local I/O, serialization).
    #[display("internal")]
    Internal,
}
