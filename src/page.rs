use crate::store::LangId;
use crate::url::PageUrl;
use serde::Deserialize;

/// One language-alternate of the current page.
#[derive(Clone, Debug, Deserialize)]
pub struct Alternate {
    pub clang_id: LangId,
    pub url: PageUrl,
}

/// The resolved current page, as the CMS request lifecycle hands it over.
/// All fields are read-only from this crate's perspective; empty strings in
/// the CMS become `None` here.
#[derive(Clone, Debug, Deserialize)]
pub struct PageContext {
    #[serde(default)]
    pub seo_title: Option<String>,

    #[serde(default)]
    pub seo_description: Option<String>,

    /// Comma-joined media names; the first resolvable one drives the image
    /// tags.
    #[serde(default)]
    pub seo_image: Option<String>,

    pub url: PageUrl,

    /// Language-alternates of this page, unordered. Tag output follows the
    /// language registry's order, not this list's.
    #[serde(default)]
    pub hreflang: Vec<Alternate>,
}

/// Resolves the page a request landed on, if the request maps to a
/// profile-managed URL at all.
pub trait PageResolver {
    fn resolve_current(&self) -> Option<PageContext>;
}
