//! Entity kinds and identifiers.

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque, stable identifier assigned by the record store on creation.
///
/// Tables mix UUID and integer primary keys; both are carried as strings.
///
/// # Examples
///
/// ```
/// use vitrine_core::EntityId;
///
/// let from_uuid = EntityId::from("0f8c2a3e-5b7d-4c1e-9a6f-2d3b4c5d6e7f");
/// let from_int = EntityId::from(42_i64);
/// assert_eq!(from_int.as_str(), "42");
/// assert_ne!(from_uuid, from_int);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a JSON value for foreign-key columns: a number when it is
    /// a canonical integer, a string otherwise.
    pub fn to_json(&self) -> serde_json::Value {
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serde_json::Value::from(n),
            _ => serde_json::Value::String(self.0.clone()),
        }
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(Self(s)),
            RawId::Int(n) => Ok(Self(n.to_string())),
        }
    }
}

/// How an entity kind persists its media reference.
///
/// Screens were written at different times and store the committed path
/// differently; new writes keep each table's existing convention so readers of
/// the public site keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Bare object key: `news-1700000000000-k3j9.jpg`
    Key,
    /// Bucket-prefixed path: `/uploads/project-banner-1700000000000-k3j9.jpg`
    BucketPrefixed,
    /// Fully resolved public URL
    PublicUrl,
}

/// Kind of editable content, one table each.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    /// Portfolio project
    Project,
    /// Image row of a project gallery
    ProjectGalleryImage,
    /// Tab shown on project detail pages
    ProjectTab,
    /// Journal/news article
    NewsArticle,
    /// Banner at the top of the about page
    AboutBanner,
    /// About page body content
    AboutContent,
    /// Image row of the about page gallery
    AboutGalleryImage,
    /// About page slider entry
    SliderItem,
    /// Offered service
    Service,
    /// Standalone gallery item
    GalleryItem,
    /// Home page intro banner
    IntroBanner,
    /// Journal page banner
    JournalBanner,
    /// "Latest projects" section banner
    LatestProjectsBanner,
    /// Award entry
    Award,
    /// Recognition list entry
    RecognitionItem,
    /// Client logo entry
    ClientItem,
    /// Site header (logo, menu, social links)
    HeaderSettings,
    /// Contact page content
    Contact,
}

impl EntityKind {
    /// Table backing this kind.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::ProjectGalleryImage => "project_gallery",
            Self::ProjectTab => "project_tabs",
            Self::NewsArticle => "news",
            Self::AboutBanner => "about_banner",
            Self::AboutContent => "about_content",
            Self::AboutGalleryImage => "about_gallery",
            Self::SliderItem => "about_slider",
            Self::Service => "services",
            Self::GalleryItem => "gallery_items",
            Self::IntroBanner => "intro_banners",
            Self::JournalBanner => "journal_banners",
            Self::LatestProjectsBanner => "latest_projects_banner",
            Self::Award => "awards",
            Self::RecognitionItem => "recognition_items",
            Self::ClientItem => "clients",
            Self::HeaderSettings => "header_settings",
            Self::Contact => "contact",
        }
    }

    /// Column holding the media reference, if the kind carries media.
    pub fn media_field(&self) -> Option<&'static str> {
        match self {
            Self::Project => Some("banner_media"),
            Self::AboutBanner | Self::GalleryItem | Self::JournalBanner => Some("image"),
            Self::IntroBanner => Some("image_url"),
            Self::HeaderSettings => Some("logo_image_url"),
            Self::ProjectTab => None,
            Self::ProjectGalleryImage
            | Self::NewsArticle
            | Self::AboutContent
            | Self::AboutGalleryImage
            | Self::SliderItem
            | Self::Service
            | Self::LatestProjectsBanner
            | Self::Award
            | Self::RecognitionItem
            | Self::ClientItem
            | Self::Contact => Some("image_path"),
        }
    }

    /// Column controlling presentation order, if the list is orderable.
    pub fn order_field(&self) -> Option<&'static str> {
        match self {
            Self::Project | Self::GalleryItem => Some("display_order"),
            Self::ProjectGalleryImage | Self::AboutGalleryImage => Some("sort"),
            Self::ProjectTab
            | Self::SliderItem
            | Self::Service
            | Self::Award
            | Self::RecognitionItem
            | Self::ClientItem => Some("order_index"),
            _ => None,
        }
    }

    /// Column linking a child row to its parent entity.
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            Self::ProjectGalleryImage => Some("project_id"),
            Self::AboutGalleryImage => Some("about_id"),
            _ => None,
        }
    }

    /// Child image collection owned by entities of this kind.
    pub fn gallery(&self) -> Option<EntityKind> {
        match self {
            Self::Project => Some(Self::ProjectGalleryImage),
            Self::AboutContent => Some(Self::AboutGalleryImage),
            _ => None,
        }
    }

    /// Prefix used when naming uploaded objects for this kind.
    pub fn object_prefix(&self) -> &'static str {
        match self {
            Self::Project => "project-banner",
            Self::ProjectGalleryImage => "project-gallery",
            Self::ProjectTab => "project-tab",
            Self::NewsArticle => "news",
            Self::AboutBanner => "about-banner",
            Self::AboutContent => "about",
            Self::AboutGalleryImage => "about-gallery",
            Self::SliderItem => "slider",
            Self::Service => "service",
            Self::GalleryItem => "gallery-item",
            Self::IntroBanner => "intro-banner",
            Self::JournalBanner => "journal-banner",
            Self::LatestProjectsBanner => "latest-projects-banner",
            Self::Award => "award",
            Self::RecognitionItem => "recognition",
            Self::ClientItem => "client",
            Self::HeaderSettings => "logo",
            Self::Contact => "contact",
        }
    }

    /// Prefix for images embedded inline in this kind's rich-text body.
    pub fn inline_prefix(&self) -> String {
        format!("{}-content", self.object_prefix())
    }

    /// How committed media paths are written for this kind.
    pub fn path_style(&self) -> PathStyle {
        match self {
            Self::Project | Self::ProjectGalleryImage | Self::GalleryItem => {
                PathStyle::BucketPrefixed
            }
            Self::HeaderSettings | Self::Contact => PathStyle::PublicUrl,
            _ => PathStyle::Key,
        }
    }

    /// Whether the kind has a rich-text body that may embed inline images.
    pub fn rich_text_field(&self) -> Option<&'static str> {
        match self {
            Self::NewsArticle => Some("content"),
            _ => None,
        }
    }
}
