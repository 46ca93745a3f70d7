//! Locally selected files awaiting upload.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use vitrine_error::ValidationError;

/// Handle for a local preview of a selected file.
///
/// Previews never reach the record store; they only exist until released.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct PreviewUrl(String);

impl PreviewUrl {
    /// Borrow the handle as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Issues and tracks preview handles.
///
/// Every preview created while a file is selected must be released when the
/// selection changes, is cancelled, or is committed.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<PreviewUrl>>,
}

impl PreviewRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new preview handle.
    pub fn create(&self) -> PreviewUrl {
        let url = PreviewUrl(format!("blob:vitrine/{}", uuid::Uuid::new_v4()));
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.clone());
        tracing::trace!(preview = %url, "Preview created");
        url
    }

    /// Release a handle. Returns `false` if it was not live.
    pub fn release(&self, url: &PreviewUrl) -> bool {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(url);
        tracing::trace!(preview = %url, removed, "Preview released");
        removed
    }

    /// Whether a handle is still live.
    pub fn is_live(&self, url: &PreviewUrl) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(url)
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A file chosen for upload but not yet sent.
///
/// # Examples
///
/// ```
/// use vitrine_core::PendingUpload;
///
/// let upload = PendingUpload::new("Team Photo.JPG", vec![0xFF, 0xD8]).unwrap();
/// assert_eq!(upload.extension(), "jpg");
/// assert_eq!(upload.content_type(), "image/jpeg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct PendingUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
    preview: Option<PreviewUrl>,
}

impl PendingUpload {
    /// Wrap a selected file; the content type is guessed from the name.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or an empty file.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(ValidationError::missing("file_name"));
        }
        if bytes.is_empty() {
            return Err(ValidationError::invalid("file", "selected file is empty"));
        }
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
            preview: None,
        })
    }

    /// Override the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Attach a preview handle.
    pub fn with_preview(mut self, preview: PreviewUrl) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Detach the preview handle, leaving the upload without one.
    pub fn take_preview(&mut self) -> Option<PreviewUrl> {
        self.preview.take()
    }

    /// Lowercased file extension; `bin` when the name has none.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Whether the guessed content type is an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
