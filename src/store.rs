//! The externally-owned data model. Profiles, languages, articles, and media
//! live in the host CMS; this crate reads them through the store traits at
//! the bottom of this module and never writes back.

use crate::url::PageUrl;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

pub type LangId = u32;
pub type ArticleId = u32;

/// A content language as the CMS registry reports it.
#[derive(Clone, Debug, Deserialize)]
pub struct Language {
    pub id: LangId,

    /// ISO code, used verbatim in `hreflang` attributes.
    pub code: String,

    pub online: bool,
}

/// The online/permission state of one article in one language.
#[derive(Clone, Debug, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub clang_id: LangId,
    pub online: bool,
    pub permitted: bool,
}

/// A media-pool asset. `url` is the site-relative path the asset is served
/// under; absolute locations are composed by prepending the page's
/// scheme-and-host.
#[derive(Clone, Debug, Deserialize)]
pub struct MediaAsset {
    pub name: String,
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,
}

const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

impl MediaAsset {
    /// Whether the asset is a raster image, judged by its file extension the
    /// way the CMS media pool does.
    pub fn is_image(&self) -> bool {
        match self.url.rsplit('.').next() {
            Some(ext) => IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
            None => false,
        }
    }
}

/// How frequently a page is expected to change. Hint values defined by the
/// sitemaps protocol; search engines treat them as advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl Default for ChangeFrequency {
    fn default() -> Self {
        ChangeFrequency::Weekly
    }
}

impl FromStr for ChangeFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ChangeFrequency::Always),
            "hourly" => Ok(ChangeFrequency::Hourly),
            "daily" => Ok(ChangeFrequency::Daily),
            "weekly" => Ok(ChangeFrequency::Weekly),
            "monthly" => Ok(ChangeFrequency::Monthly),
            "yearly" => Ok(ChangeFrequency::Yearly),
            "never" => Ok(ChangeFrequency::Never),
            _ => Err(format!("invalid changefreq value: {}", s)),
        }
    }
}

/// A configured URL-generation rule: one class of pages mapping to one or
/// more concrete URLs plus their sitemap metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct Profile {
    /// Whether the profile participates in sitemaps at all. A profile with
    /// this unset contributes zero entries regardless of its URLs' own
    /// publish flags.
    #[serde(default = "default_true")]
    pub in_sitemap: bool,

    /// The article the profile is mounted on.
    pub article_id: ArticleId,

    /// The fixed language of that article. `None` means "all languages", in
    /// which case the full sitemap render checks language and article per
    /// URL instead of once per profile.
    #[serde(default)]
    pub article_clang_id: Option<LangId>,

    #[serde(default)]
    pub sitemap_frequency: ChangeFrequency,

    #[serde(default = "default_priority")]
    pub sitemap_priority: f32,

    #[serde(default)]
    pub urls: Vec<ProfileUrl>,
}

/// One concrete URL yielded by a profile.
#[derive(Clone, Debug, Deserialize)]
pub struct ProfileUrl {
    pub url: PageUrl,

    pub lastmod: DateTime<Utc>,

    /// The URL's own sitemap publish flag.
    #[serde(default = "default_true")]
    pub sitemap: bool,

    /// Comma-joined media names for `<image:image>` sub-entries.
    #[serde(default)]
    pub seo_image: Option<String>,

    pub clang_id: LangId,

    /// True when the URL is a structural/navigational node backed by its own
    /// article rather than a profile-generated record page.
    #[serde(default)]
    pub structure: bool,

    /// The backing article for structural nodes.
    #[serde(default)]
    pub article_id: ArticleId,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> f32 {
    0.5
}

pub trait ProfileStore {
    /// Every configured profile, in registry order. Sitemap output follows
    /// this order; no independent sort is applied.
    fn all(&self) -> Vec<Profile>;
}

pub trait LanguageStore {
    fn get(&self, id: LangId) -> Option<Language>;

    /// Ids of all online languages, in registry order.
    fn online_ids(&self) -> Vec<LangId>;
}

pub trait ArticleStore {
    fn get(&self, article_id: ArticleId, clang_id: LangId) -> Option<Article>;
}

pub trait MediaStore {
    fn get(&self, name: &str) -> Option<MediaAsset>;
}

#[cfg(test)]
mod test {
    use super::*;

    fn asset(url: &str) -> MediaAsset {
        MediaAsset {
            name: "x".to_owned(),
            url: url.to_owned(),
            title: String::new(),
            width: None,
            height: None,
        }
    }

    #[test]
    fn test_is_image() {
        assert!(asset("/media/photo.jpg").is_image());
        assert!(asset("/media/PHOTO.PNG").is_image());
        assert!(!asset("/media/brochure.pdf").is_image());
        assert!(!asset("/media/no-extension").is_image());
    }

    #[test]
    fn test_changefreq_parse() {
        assert_eq!(Ok(ChangeFrequency::Daily), "daily".parse());
        assert!("sometimes".parse::<ChangeFrequency>().is_err());
    }
}
