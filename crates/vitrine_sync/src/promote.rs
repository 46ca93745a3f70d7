//! Inline images of rich-text drafts.
//!
//! While an article is edited, images inserted into its body are uploaded at
//! once under the temp namespace and embedded by public URL. When the article
//! is saved with a known id, [`TempMediaPromoter::promote`] moves every temp
//! object it still references to a permanent name and rewrites the URLs.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use vitrine_core::{EntityId, EntityKind, PendingUpload, RecordPatch};
use vitrine_error::{ValidationError, VitrineResult};
use vitrine_records::RecordStore;
use vitrine_storage::{ObjectStorage, temp_object_name, unique_object_name};

/// An uploaded inline image, ready to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct InlineImage {
    key: String,
    url: String,
}

/// Result of rewriting a draft body.
#[derive(Debug, Clone, Default, Serialize, derive_getters::Getters)]
pub struct PromotionReport {
    /// The body with every promoted URL rewritten
    html: String,
    /// `(temp key, permanent key)` pairs that were moved
    promoted: Vec<(String, String)>,
    /// `(temp key, reason)` pairs left in place
    failed: Vec<(String, String)>,
}

impl PromotionReport {
    /// Whether the body changed.
    pub fn changed(&self) -> bool {
        !self.promoted.is_empty()
    }

    /// Consume the report, keeping the rewritten body.
    pub fn into_html(self) -> String {
        self.html
    }
}

/// Uploads and promotes inline images of rich-text bodies.
#[derive(Clone)]
pub struct TempMediaPromoter {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn RecordStore>,
    temp_prefix: String,
    temp_url: Regex,
}

impl std::fmt::Debug for TempMediaPromoter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempMediaPromoter")
            .field("storage", &self.storage.backend_name())
            .field("temp_prefix", &self.temp_prefix)
            .finish()
    }
}

fn extension_of(key: &str) -> &str {
    key.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.contains('/'))
        .unwrap_or("bin")
}

impl TempMediaPromoter {
    /// Create a promoter for the given temp namespace (e.g. `temp/`).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the temp prefix is blank.
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
        temp_prefix: impl Into<String>,
    ) -> VitrineResult<Self> {
        let mut temp_prefix = temp_prefix.into().trim_matches('/').to_string();
        if temp_prefix.is_empty() {
            return Err(ValidationError::missing("temp_prefix").into());
        }
        temp_prefix.push('/');

        let pattern = format!(
            "{}{}[A-Za-z0-9._\\-/]+",
            regex::escape(&storage.public_base().bucket_url()),
            regex::escape(&temp_prefix)
        );
        let temp_url = Regex::new(&pattern)
            .map_err(|e| ValidationError::invalid("temp_prefix", e.to_string()))?;

        Ok(Self {
            storage,
            records,
            temp_prefix,
            temp_url,
        })
    }

    /// The temp namespace, always ending in `/`.
    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    /// Upload an image inserted into a draft body.
    ///
    /// # Errors
    ///
    /// Returns the storage error of the upload.
    #[instrument(skip(self, upload), fields(kind = %kind, file = %upload.file_name()))]
    pub async fn upload_inline(
        &self,
        kind: EntityKind,
        upload: &PendingUpload,
    ) -> VitrineResult<InlineImage> {
        let key = temp_object_name(&self.temp_prefix, &kind.inline_prefix(), &upload.extension());
        self.storage
            .upload(&key, upload.bytes(), upload.content_type())
            .await?;
        let url = self.storage.public_url(&key);
        debug!(key, "Inline image uploaded");
        Ok(InlineImage { key, url })
    }

    /// Temp keys referenced by a body, in order of first appearance.
    pub fn temp_keys(&self, html: &str) -> Vec<String> {
        let bucket_url = self.storage.public_base().bucket_url();
        let mut seen = BTreeSet::new();
        self.temp_url
            .find_iter(html)
            .filter_map(|m| m.as_str().strip_prefix(&bucket_url).map(str::to_string))
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }

    /// Move every temp object the body references to a permanent name keyed
    /// by the article id and rewrite its URL.
    ///
    /// A failed move leaves the temp URL in place; it is not retried.
    #[instrument(skip(self, html), fields(kind = %kind, article = %article_id))]
    pub async fn promote(&self, kind: EntityKind, article_id: &EntityId, html: &str) -> PromotionReport {
        let mut report = PromotionReport {
            html: html.to_string(),
            ..PromotionReport::default()
        };
        let prefix = format!("{}-{}", kind.inline_prefix(), article_id);

        for temp_key in self.temp_keys(html) {
            let permanent = unique_object_name(&prefix, extension_of(&temp_key));
            match self.storage.relocate(&temp_key, &permanent).await {
                Ok(()) => {
                    let from = self.storage.public_url(&temp_key);
                    let to = self.storage.public_url(&permanent);
                    report.html = report.html.replace(&from, &to);
                    debug!(from = temp_key, to = permanent, "Inline image promoted");
                    report.promoted.push((temp_key, permanent));
                }
                Err(e) => {
                    warn!(key = temp_key, error = %e, "Inline image left in temp namespace");
                    report.failed.push((temp_key, e.kind.to_string()));
                }
            }
        }

        info!(
            promoted = report.promoted.len(),
            failed = report.failed.len(),
            "Draft body promoted"
        );
        report
    }

    /// Promote a saved article's body and write it back when it changed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the kind has no rich-text body, or the
    /// record error of the read or the write.
    pub async fn promote_and_save(
        &self,
        kind: EntityKind,
        article_id: &EntityId,
    ) -> VitrineResult<PromotionReport> {
        let field = kind.rich_text_field().ok_or_else(|| {
            ValidationError::invalid("kind", format!("'{}' has no rich-text body", kind))
        })?;
        let record = self.records.get_by_id(kind, article_id).await?;
        let html = record.str_field(field).unwrap_or_default().to_string();

        let report = self.promote(kind, article_id, &html).await;
        if report.changed() {
            let mut patch = RecordPatch::new();
            patch.set(field, report.html.clone());
            self.records.update(kind, article_id, patch).await?;
        }
        Ok(report)
    }
}
