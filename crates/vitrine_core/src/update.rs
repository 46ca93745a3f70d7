//! Typed partial updates, one shape per family of entity kinds.
//!
//! Forms never send free-form field bags. Each entity kind accepts one update
//! shape holding only the columns an editor may change; the shape is validated
//! before anything is dispatched and is then lowered to a [`RecordPatch`].

use crate::{EntityKind, RecordPatch};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use vitrine_error::{ValidationError, ValidationErrorKind};

/// Build a URL slug from a title.
///
/// Lowercases, drops everything outside `[a-z0-9 -]`, turns whitespace runs into
/// single dashes and collapses repeated dashes.
///
/// # Examples
///
/// ```
/// use vitrine_core::slugify;
///
/// assert_eq!(slugify("Hello  World -- 2024!"), "hello-world-2024");
/// ```
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    kept.split(|c: char| c == ' ' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_slug(slug: &Option<String>) -> Result<(), ValidationError> {
    match slug {
        Some(s) if !is_valid_slug(s) => Err(ValidationError::invalid(
            "slug",
            format!("'{}' is not a slug", s),
        )),
        _ => Ok(()),
    }
}

fn require_text(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::missing(field)),
        _ => Ok(()),
    }
}

fn require_present(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::missing(field)),
    }
}

fn check_link(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v)
            if !v.is_empty()
                && !(v.starts_with('/')
                    || v.starts_with('#')
                    || v.starts_with("http://")
                    || v.starts_with("https://")
                    || v.starts_with("mailto:")
                    || v.starts_with("tel:")) =>
        {
            Err(ValidationError::invalid(
                field,
                "links must be absolute URLs, site paths, anchors, mailto: or tel:",
            ))
        }
        _ => Ok(()),
    }
}

/// Editable columns of a project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ProjectUpdate {
    /// Project title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Subtitle line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// URL slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Year of delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Studio role on the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Link to the live work
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    /// Hosted video URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Shown on the home page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    /// Order among featured projects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_order: Option<i64>,
    /// Order in the project list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl ProjectUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        check_slug(&self.slug)?;
        if let Some(year) = self.year.filter(|y| !(1900..=2200).contains(y)) {
            return Err(ValidationError::invalid("year", format!("{} is out of range", year)));
        }
        check_link("external_link", &self.external_link)?;
        check_link("video_url", &self.video_url)
    }
}

/// Editable columns of a news article.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct NewsUpdate {
    /// Headline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Category label shown above the headline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_text: Option<String>,
    /// URL slug
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Rich-text HTML body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NewsUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("slug", &self.slug)?;
        check_slug(&self.slug)
    }

    /// Fill in a missing slug from the title.
    pub fn with_derived_slug(mut self) -> Self {
        let missing = self.slug.as_deref().is_none_or(|s| s.trim().is_empty());
        if missing {
            self.slug = self.title.as_deref().map(slugify);
        }
        self
    }
}

/// Editable columns shared by banner-like singletons.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct BannerUpdate {
    /// Title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Subtitle line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Desktop title variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_desktop: Option<String>,
    /// Mobile title variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_mobile: Option<String>,
    /// Call-to-action label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    /// Call-to-action target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
}

impl BannerUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        check_link("button_link", &self.button_link)?;
        if self.button_text.as_deref().is_some_and(|t| !t.trim().is_empty())
            && self.button_link.as_deref().is_some_and(|l| l.trim().is_empty())
        {
            return Err(ValidationError::missing("button_link"));
        }
        Ok(())
    }
}

/// Editable columns shared by ordered image lists (services, sliders, awards…).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ImageItemUpdate {
    /// Title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional link target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Presentation order; written to the kind's order column
    #[serde(skip)]
    pub order: Option<i64>,
}

impl ImageItemUpdate {
    fn validate(&self, kind: EntityKind) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        check_link("link", &self.link)?;
        if let Some(order) = self.order {
            if kind.order_field().is_none() {
                return Err(ValidationError::invalid(
                    "order",
                    format!("'{}' is not an ordered list", kind),
                ));
            }
            if order < 0 {
                return Err(ValidationError::invalid("order", "must not be negative"));
            }
        }
        Ok(())
    }
}

/// Header menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable item id
    pub id: String,
    /// Target path or URL
    pub href: String,
    /// Visible label
    pub label: String,
    /// Position in the menu
    pub order: i64,
}

/// Social or sitemap link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    /// Visible name
    pub name: String,
    /// Target URL
    pub link: String,
}

/// Editable columns of the site header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct HeaderUpdate {
    /// Text logo used when no logo image is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_text: Option<String>,
    /// Navigation entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_items: Option<Vec<MenuItem>>,
    /// Social links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_items: Option<Vec<LinkItem>>,
}

impl HeaderUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        for item in self.menu_items.iter().flatten() {
            require_present("menu_items.label", &Some(item.label.clone()))?;
            require_present("menu_items.href", &Some(item.href.clone()))?;
            check_link("menu_items.href", &Some(item.href.clone()))?;
        }
        for item in self.social_items.iter().flatten() {
            require_present("social_items.name", &Some(item.name.clone()))?;
            check_link("social_items.link", &Some(item.link.clone()))?;
        }
        Ok(())
    }
}

/// Editable columns of the contact page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ContactUpdate {
    /// Heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact e-mail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postal address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Map link for the address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_link: Option<String>,
    /// Social links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_items: Option<Vec<LinkItem>>,
}

impl ContactUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'));
            if !valid {
                return Err(ValidationError::invalid("email", format!("'{}' is not an e-mail", email)));
            }
        }
        check_link("address_link", &self.address_link)
    }
}

/// The field shape of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum UpdateFields {
    /// Media-only change; no other column moves
    Empty,
    /// Project columns
    Project(ProjectUpdate),
    /// News article columns
    News(NewsUpdate),
    /// Banner columns
    Banner(BannerUpdate),
    /// Ordered image list columns
    ImageItem(ImageItemUpdate),
    /// Header columns
    Header(HeaderUpdate),
    /// Contact page columns
    Contact(ContactUpdate),
}

/// A typed partial update for one entity kind.
///
/// # Examples
///
/// ```
/// use vitrine_core::{EntityKind, EntityUpdate, NewsUpdate, UpdateFields};
///
/// let update = EntityUpdate::new(
///     EntityKind::NewsArticle,
///     UpdateFields::News(NewsUpdate::default().with_title("Opening night").with_slug("opening-night")),
/// );
/// let patch = update.into_patch().unwrap();
/// assert_eq!(patch.get("slug").and_then(|v| v.as_str()), Some("opening-night"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct EntityUpdate {
    kind: EntityKind,
    fields: UpdateFields,
}

impl EntityUpdate {
    /// Pair an update shape with the entity kind it targets.
    pub fn new(kind: EntityKind, fields: UpdateFields) -> Self {
        Self { kind, fields }
    }

    /// An update that changes no column besides media.
    pub fn media_only(kind: EntityKind) -> Self {
        Self::new(kind, UpdateFields::Empty)
    }

    fn shape_name(&self) -> &'static str {
        match self.fields {
            UpdateFields::Empty => "empty",
            UpdateFields::Project(_) => "project",
            UpdateFields::News(_) => "news",
            UpdateFields::Banner(_) => "banner",
            UpdateFields::ImageItem(_) => "image item",
            UpdateFields::Header(_) => "header",
            UpdateFields::Contact(_) => "contact",
        }
    }

    fn shape_fits_kind(&self) -> bool {
        use EntityKind as K;
        match &self.fields {
            UpdateFields::Empty => true,
            UpdateFields::Project(_) => self.kind == K::Project,
            UpdateFields::News(_) => self.kind == K::NewsArticle,
            UpdateFields::Banner(_) => matches!(
                self.kind,
                K::AboutBanner | K::IntroBanner | K::JournalBanner | K::LatestProjectsBanner
            ),
            UpdateFields::ImageItem(_) => matches!(
                self.kind,
                K::ProjectGalleryImage
                    | K::ProjectTab
                    | K::AboutContent
                    | K::AboutGalleryImage
                    | K::SliderItem
                    | K::Service
                    | K::GalleryItem
                    | K::Award
                    | K::RecognitionItem
                    | K::ClientItem
            ),
            UpdateFields::Header(_) => self.kind == K::HeaderSettings,
            UpdateFields::Contact(_) => self.kind == K::Contact,
        }
    }

    /// Check the update against its kind and field rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule the update breaks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.shape_fits_kind() {
            return Err(ValidationError::new(ValidationErrorKind::KindMismatch {
                expected: self.shape_name().to_string(),
                actual: self.kind.to_string(),
            }));
        }

        match &self.fields {
            UpdateFields::Empty => Ok(()),
            UpdateFields::Project(u) => u.validate(),
            UpdateFields::News(u) => u.validate(),
            UpdateFields::Banner(u) => u.validate(),
            UpdateFields::ImageItem(u) => u.validate(self.kind),
            UpdateFields::Header(u) => u.validate(),
            UpdateFields::Contact(u) => u.validate(),
        }
    }

    /// Check the columns a new row of this kind cannot be created without.
    ///
    /// # Errors
    ///
    /// Returns a missing-field error for the first absent required column.
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        self.validate()?;
        match &self.fields {
            UpdateFields::Project(u) => {
                require_present("title", &u.title)?;
                require_present("slug", &u.slug)
            }
            UpdateFields::News(u) => {
                require_present("title", &u.title)?;
                require_present("slug", &u.slug)
            }
            _ => Ok(()),
        }
    }

    /// Validate and lower into a record patch.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the update breaks a rule.
    pub fn into_patch(self) -> Result<RecordPatch, ValidationError> {
        self.validate()?;

        let kind = self.kind;
        let value = match self.fields {
            UpdateFields::Empty => return Ok(RecordPatch::new()),
            UpdateFields::Project(u) => serde_json::to_value(u),
            UpdateFields::News(u) => serde_json::to_value(u),
            UpdateFields::Banner(u) => serde_json::to_value(u),
            UpdateFields::Header(u) => serde_json::to_value(u),
            UpdateFields::Contact(u) => serde_json::to_value(u),
            UpdateFields::ImageItem(u) => {
                let order = u.order;
                let mut value = serde_json::to_value(u);
                if let (Ok(JsonValue::Object(map)), Some(order), Some(field)) =
                    (&mut value, order, kind.order_field())
                {
                    map.insert(field.to_string(), JsonValue::from(order));
                }
                value
            }
        }
        .map_err(|e| ValidationError::invalid("update", e.to_string()))?;

        match value {
            JsonValue::Object(map) => Ok(RecordPatch::from(map)),
            _ => Err(ValidationError::invalid("update", "did not encode to an object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_matches_editor_behaviour() {
        assert_eq!(slugify("Design Week: Milan"), "design-week-milan");
        assert_eq!(slugify("  Çay & Simit  "), "ay-simit");
        assert_eq!(slugify("a---b"), "a-b");
    }

    #[test]
    fn shape_must_match_kind() {
        let update = EntityUpdate::new(
            EntityKind::Service,
            UpdateFields::News(NewsUpdate::default().with_title("x").with_slug("x")),
        );
        let err = update.validate().unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::KindMismatch { .. }));
    }

    #[test]
    fn blank_required_text_is_rejected() {
        let update = EntityUpdate::new(
            EntityKind::NewsArticle,
            UpdateFields::News(NewsUpdate::default().with_title("  ").with_slug("ok")),
        );
        let err = update.validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField("title".to_string()));
    }

    #[test]
    fn create_requires_title_and_slug() {
        let update = EntityUpdate::new(
            EntityKind::Project,
            UpdateFields::Project(ProjectUpdate::default().with_title("Harbour")),
        );
        assert!(update.validate().is_ok());
        assert!(update.validate_for_create().is_err());
    }

    #[test]
    fn derived_slug_fills_missing_slug() {
        let news = NewsUpdate::default().with_title("Studio Opening 2025").with_derived_slug();
        assert_eq!(news.slug.as_deref(), Some("studio-opening-2025"));
    }

    #[test]
    fn image_item_order_lands_in_kind_column() {
        let patch = EntityUpdate::new(
            EntityKind::ProjectGalleryImage,
            UpdateFields::ImageItem(ImageItemUpdate::default().with_order(4_i64)),
        )
        .into_patch()
        .unwrap();
        assert_eq!(patch.get("sort").and_then(|v| v.as_i64()), Some(4));
        assert!(patch.get("order").is_none());
    }

    #[test]
    fn order_on_unordered_kind_is_rejected() {
        let update = EntityUpdate::new(
            EntityKind::AboutContent,
            UpdateFields::ImageItem(ImageItemUpdate::default().with_order(1_i64)),
        );
        assert!(update.validate().is_err());
    }

    #[test]
    fn contact_email_is_checked() {
        let update = EntityUpdate::new(
            EntityKind::Contact,
            UpdateFields::Contact(ContactUpdate::default().with_email("studio")),
        );
        assert!(update.validate().is_err());
    }

    #[test]
    fn relative_links_without_slash_are_rejected() {
        let update = EntityUpdate::new(
            EntityKind::AboutBanner,
            UpdateFields::Banner(BannerUpdate::default().with_button_link("about")),
        );
        assert!(update.validate().is_err());
    }

    #[test]
    fn untouched_columns_are_not_sent() {
        let patch = EntityUpdate::new(
            EntityKind::Project,
            UpdateFields::Project(ProjectUpdate::default().with_title("Harbour")),
        )
        .into_patch()
        .unwrap();
        assert_eq!(patch.len(), 1);
    }
}
