//! Media path parsing and resolution.

use crate::PathStyle;
use serde::{Deserialize, Serialize};

const PUBLIC_OBJECT_SEGMENT: &str = "/storage/v1/object/public/";

/// Where public objects of the bucket are served from.
///
/// Public URLs follow `{storage_base_url}/storage/v1/object/public/{bucket}/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PublicUrlBase {
    storage_base_url: String,
    bucket: String,
}

impl PublicUrlBase {
    /// Create a base from the storage host URL and bucket name.
    pub fn new(storage_base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        let storage_base_url = storage_base_url.into().trim_end_matches('/').to_string();
        Self {
            storage_base_url,
            bucket: bucket.into(),
        }
    }

    /// Public URL of an object key.
    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}{}{}/{}",
            self.storage_base_url,
            PUBLIC_OBJECT_SEGMENT,
            self.bucket,
            key.trim_start_matches('/')
        )
    }

    /// URL prefix under which every object of this bucket is served.
    pub fn bucket_url(&self) -> String {
        format!(
            "{}{}{}/",
            self.storage_base_url, PUBLIC_OBJECT_SEGMENT, self.bucket
        )
    }
}

/// A persisted media reference.
///
/// The raw value is kept exactly as stored so that an untouched record is never
/// rewritten. It may be a bare object key, a bucket-prefixed path, a public
/// storage URL, or a URL to media hosted elsewhere.
///
/// # Examples
///
/// ```
/// use vitrine_core::MediaPath;
///
/// let stored = MediaPath::parse("/uploads/old.jpg").unwrap();
/// assert_eq!(stored.object_key("uploads").as_deref(), Some("old.jpg"));
///
/// let external = MediaPath::parse("https://vimeo.com/123").unwrap();
/// assert!(external.object_key("uploads").is_none());
///
/// assert!(MediaPath::parse("   ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(transparent)]
pub struct MediaPath(String);

impl MediaPath {
    /// Parse a stored value; blank values mean "no media".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Build the value to persist for a freshly uploaded object.
    pub fn committed(key: &str, style: PathStyle, base: &PublicUrlBase) -> Self {
        let key = key.trim_start_matches('/');
        match style {
            PathStyle::Key => Self(key.to_string()),
            PathStyle::BucketPrefixed => Self(format!("/{}/{}", base.bucket(), key)),
            PathStyle::PublicUrl => Self(base.url_for(key)),
        }
    }

    /// The value exactly as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this reference points at a `data:` URL or at another host.
    ///
    /// Public URLs of our own bucket are not external.
    pub fn is_external(&self, bucket: &str) -> bool {
        self.object_key(bucket).is_none()
    }

    /// Bucket-relative object key, or `None` when the media is not ours to delete.
    pub fn object_key(&self, bucket: &str) -> Option<String> {
        let raw = self.0.trim();

        if raw.starts_with("data:") {
            return None;
        }

        let marker = format!("{}{}/", PUBLIC_OBJECT_SEGMENT, bucket);
        if let Some(pos) = raw.find(&marker) {
            let key = &raw[pos + marker.len()..];
            let key = key.split(['?', '#']).next().unwrap_or_default();
            return (!key.is_empty()).then(|| key.to_string());
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || raw.starts_with("//")
        {
            return None;
        }

        let mut key = raw.replace('\\', "/");
        key = key.trim_start_matches('/').to_string();
        let bucket_prefix = format!("{}/", bucket);
        while let Some(rest) = key.strip_prefix(&bucket_prefix) {
            key = rest.trim_start_matches('/').to_string();
        }

        (!key.is_empty()).then_some(key)
    }

    /// Resolvable URL for display.
    pub fn public_url(&self, base: &PublicUrlBase) -> String {
        match self.object_key(base.bucket()) {
            Some(key) => base.url_for(&key),
            None => self.0.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PublicUrlBase {
        PublicUrlBase::new("https://demo.supabase.co/", "uploads")
    }

    #[test]
    fn strips_repeated_bucket_prefixes_and_backslashes() {
        let p = MediaPath::parse("uploads/uploads\\news-1.jpg").unwrap();
        assert_eq!(p.object_key("uploads").as_deref(), Some("news-1.jpg"));
    }

    #[test]
    fn public_storage_url_resolves_to_key_with_subpath() {
        let p = MediaPath::parse(
            "https://demo.supabase.co/storage/v1/object/public/uploads/temp/x.png?v=2",
        )
        .unwrap();
        assert_eq!(p.object_key("uploads").as_deref(), Some("temp/x.png"));
    }

    #[test]
    fn other_hosts_and_data_urls_are_external() {
        for raw in [
            "https://cdn.example.com/a.jpg",
            "//cdn.example.com/a.jpg",
            "data:image/png;base64,AAAA",
        ] {
            let p = MediaPath::parse(raw).unwrap();
            assert!(p.is_external("uploads"), "{raw}");
            assert_eq!(p.public_url(&base()), raw);
        }
    }

    #[test]
    fn committed_paths_follow_style() {
        let b = base();
        assert_eq!(
            MediaPath::committed("a.jpg", PathStyle::Key, &b).as_str(),
            "a.jpg"
        );
        assert_eq!(
            MediaPath::committed("a.jpg", PathStyle::BucketPrefixed, &b).as_str(),
            "/uploads/a.jpg"
        );
        assert_eq!(
            MediaPath::committed("a.jpg", PathStyle::PublicUrl, &b).as_str(),
            "https://demo.supabase.co/storage/v1/object/public/uploads/a.jpg"
        );
    }

    #[test]
    fn every_style_resolves_back_to_the_same_key() {
        let b = base();
        for style in [PathStyle::Key, PathStyle::BucketPrefixed, PathStyle::PublicUrl] {
            let p = MediaPath::committed("logo-1.png", style, &b);
            assert_eq!(p.object_key("uploads").as_deref(), Some("logo-1.png"));
        }
    }
}
