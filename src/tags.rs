//! Tag assembly for the page `<head>`: title, description, canonical,
//! hreflang alternates, and Open Graph/Twitter card fields. The CMS default
//! renderer supplies a base [`TagSet`]; [`Seo`] overrides and extends it from
//! the resolved page context.

use crate::page::{PageContext, PageResolver};
use crate::sanitize;
use crate::store::{LanguageStore, MediaAsset, MediaStore};
use crate::url::Scheme;

/// An ordered mapping from tag name (`title`, `og:image:width`, ...) to a
/// literal markup string. Insertion order determines output order; setting an
/// existing name overwrites its value without moving it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagSet {
    items: Vec<(String, String)>,
}

impl TagSet {
    pub fn new() -> TagSet {
        TagSet::default()
    }

    pub fn set(&mut self, name: &str, markup: String) {
        match self.items.iter_mut().find(|(n, _)| n == name) {
            Some((_, value)) => *value = markup,
            None => self.items.push((name.to_owned(), markup)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serializes the set into its final form: the markup strings joined by
    /// newlines, in insertion order.
    pub fn join(&self) -> String {
        self.items
            .iter()
            .map(|(_, v)| v.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

impl<'a> std::iter::FromIterator<(&'a str, &'a str)> for TagSet {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> TagSet {
        let mut tags = TagSet::new();
        for (name, markup) in iter {
            tags.set(name, markup.to_owned());
        }
        tags
    }
}

pub type TagFilter = Box<dyn Fn(TagSet) -> TagSet>;

/// An explicit, ordered list of named tag filters. The caller registers
/// filters up front and [`Seo::tags`] runs the finished set through them
/// before serialization; nothing registers itself globally.
#[derive(Default)]
pub struct TagHooks {
    filters: Vec<(String, TagFilter)>,
}

impl TagHooks {
    pub fn new() -> TagHooks {
        TagHooks::default()
    }

    pub fn register<F>(&mut self, name: &str, filter: F)
    where
        F: Fn(TagSet) -> TagSet + 'static,
    {
        self.filters.push((name.to_owned(), Box::new(filter)));
    }

    pub fn apply(&self, tags: TagSet) -> TagSet {
        self.filters
            .iter()
            .fold(tags, |tags, (_, filter)| filter(tags))
    }
}

/// The tag assembler for one request. Construction resolves the current page
/// exactly once; `is_frontend` decides whether resolution happens at all, so
/// backend requests get an assembler where every rewrite degrades to
/// identity.
pub struct Seo<'a> {
    page: Option<PageContext>,
    languages: &'a dyn LanguageStore,
    media: &'a dyn MediaStore,
    scheme: Scheme,
    hooks: TagHooks,
}

impl<'a> Seo<'a> {
    pub fn new(
        is_frontend: bool,
        resolver: &dyn PageResolver,
        languages: &'a dyn LanguageStore,
        media: &'a dyn MediaStore,
        scheme: Scheme,
    ) -> Seo<'a> {
        Seo {
            page: if is_frontend {
                resolver.resolve_current()
            } else {
                None
            },
            languages,
            media,
            scheme,
            hooks: TagHooks::new(),
        }
    }

    pub fn hooks_mut(&mut self) -> &mut TagHooks {
        &mut self.hooks
    }

    pub fn page(&self) -> Option<&PageContext> {
        self.page.as_ref()
    }

    /// Named rewrite for the title the CMS renderer computed: prepends the
    /// page's SEO title when one is set.
    pub fn title(&self, current: &str) -> String {
        match self.page_field(|p| &p.seo_title) {
            Some(seo) => format!("{} / {}", seo, current),
            None => current.to_owned(),
        }
    }

    /// Named rewrite for the description: replaces the computed one when the
    /// page carries its own.
    pub fn description(&self, current: &str) -> String {
        match self.page_field(|p| &p.seo_description) {
            Some(seo) => seo.to_owned(),
            None => current.to_owned(),
        }
    }

    /// Named rewrite for the canonical URL: the resolved page's absolute URL
    /// under the site scheme.
    pub fn canonical(&self, current: &str) -> String {
        match &self.page {
            Some(page) => page.url.solved(self.scheme).to_string(),
            None => current.to_owned(),
        }
    }

    /// Named rewrite for the hreflang map: replaced by the page's online
    /// alternates when any exist.
    pub fn hreflang(&self, current: &[(String, String)]) -> Vec<(String, String)> {
        match &self.page {
            Some(page) => {
                let alternates = self.alternates(page);
                if alternates.is_empty() {
                    current.to_vec()
                } else {
                    alternates
                }
            }
            None => current.to_vec(),
        }
    }

    /// Named rewrite for the image ref list: fills in the page's SEO image
    /// refs when the computed value is empty.
    pub fn images(&self, current: &str) -> String {
        if !current.is_empty() {
            return current.to_owned();
        }
        match self.page_field(|p| &p.seo_image) {
            Some(refs) => refs.to_owned(),
            None => current.to_owned(),
        }
    }

    /// The fully-qualified URL of the current page: scheme + host + path,
    /// query and fragment dropped.
    pub fn full_url(&self) -> Option<String> {
        self.page
            .as_ref()
            .map(|p| p.url.solved(self.scheme).without_query())
    }

    /// Produces the final head markup from the CMS-rendered base set. With no
    /// resolved page the base set passes through untouched; otherwise the
    /// page context overrides and extends it, the registered filters run, and
    /// the result is joined by newlines.
    pub fn tags(&self, base: TagSet) -> String {
        let mut tags = base;

        let page = match &self.page {
            Some(page) => page,
            None => return tags.join(),
        };

        if let Some(title) = self.page_field(|p| &p.seo_title) {
            let title = sanitize::normalize(title);
            tags.set("title", format!("<title>{}</title>", title));
            tags.set(
                "og:title",
                format!("<meta property=\"og:title\" content=\"{}\" />", title),
            );
            tags.set(
                "twitter:title",
                format!("<meta name=\"twitter:title\" content=\"{}\" />", title),
            );
        }

        if let Some(description) = self.page_field(|p| &p.seo_description) {
            let description = sanitize::normalize(description);
            tags.set(
                "description",
                format!("<meta name=\"description\" content=\"{}\" />", description),
            );
            tags.set(
                "og:description",
                format!(
                    "<meta property=\"og:description\" content=\"{}\" />",
                    description
                ),
            );
            tags.set(
                "twitter:description",
                format!(
                    "<meta name=\"twitter:description\" content=\"{}\" />",
                    description
                ),
            );
        }

        let full_url = sanitize::escape(&page.url.solved(self.scheme).without_query());
        tags.set(
            "canonical",
            format!("<link rel=\"canonical\" href=\"{}\" />", full_url),
        );
        tags.set(
            "og:url",
            format!("<meta property=\"og:url\" content=\"{}\" />", full_url),
        );
        tags.set(
            "twitter:url",
            format!("<meta name=\"twitter:url\" content=\"{}\" />", full_url),
        );

        for (code, href) in self.alternates(page) {
            tags.set(
                &format!("hreflang:{}", code),
                format!(
                    "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\" />",
                    code,
                    sanitize::escape(&href)
                ),
            );
        }

        tags.set(
            "twitter:card",
            "<meta name=\"twitter:card\" content=\"summary\" />".to_owned(),
        );

        if let Some(refs) = self.page_field(|p| &p.seo_image) {
            if let Some(media) = self.first_resolvable(refs) {
                let media_url = sanitize::escape(&format!(
                    "{}{}",
                    page.url.solved(self.scheme).scheme_and_host(),
                    media.url
                ));

                tags.set(
                    "twitter:card",
                    "<meta name=\"twitter:card\" content=\"summary_large_image\" />".to_owned(),
                );
                tags.set(
                    "image",
                    format!("<meta name=\"image\" content=\"{}\" />", media_url),
                );
                tags.set(
                    "og:image",
                    format!("<meta property=\"og:image\" content=\"{}\" />", media_url),
                );
                tags.set(
                    "twitter:image",
                    format!("<meta name=\"twitter:image\" content=\"{}\" />", media_url),
                );

                if let Some(width) = media.width {
                    tags.set(
                        "og:image:width",
                        format!("<meta property=\"og:image:width\" content=\"{}\" />", width),
                    );
                }
                if let Some(height) = media.height {
                    tags.set(
                        "og:image:height",
                        format!(
                            "<meta property=\"og:image:height\" content=\"{}\" />",
                            height
                        ),
                    );
                }
            }
        }

        self.hooks.apply(tags).join()
    }

    // A page field with the CMS's empty-string-means-unset convention
    // applied.
    fn page_field<F>(&self, field: F) -> Option<&str>
    where
        F: Fn(&PageContext) -> &Option<String>,
    {
        self.page
            .as_ref()
            .and_then(|p| field(p).as_deref())
            .filter(|s| !s.is_empty())
    }

    // The page's alternates restricted to online languages, in language
    // registry order.
    fn alternates(&self, page: &PageContext) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for id in self.languages.online_ids() {
            let alternate = match page.hreflang.iter().find(|a| a.clang_id == id) {
                Some(alternate) => alternate,
                None => continue,
            };
            let language = match self.languages.get(id) {
                Some(language) => language,
                None => continue,
            };
            out.push((
                language.code,
                alternate.url.solved(self.scheme).to_string(),
            ));
        }
        out
    }

    // The first media name in a comma-joined ref list that resolves. Empty
    // and unresolvable refs are skipped silently.
    fn first_resolvable(&self, refs: &str) -> Option<MediaAsset> {
        refs.split(',')
            .filter(|name| !name.is_empty())
            .find_map(|name| self.media.get(name))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::MemoryStore;

    const FIXTURE: &str = r#"
languages:
  - { id: 1, code: de, online: true }
  - { id: 2, code: en, online: true }
  - { id: 3, code: fr, online: false }
media:
  - { name: cover.jpg, url: /media/cover.jpg, title: Cover, width: 1200, height: 630 }
  - { name: plain.jpg, url: /media/plain.jpg }
"#;

    fn store() -> MemoryStore {
        MemoryStore::from_yaml(FIXTURE).unwrap()
    }

    fn store_with_page(page: &str) -> MemoryStore {
        MemoryStore::from_yaml(&format!("{}page:\n{}", FIXTURE, page)).unwrap()
    }

    fn base() -> TagSet {
        vec![
            ("title", "<title>Default</title>"),
            ("description", "<meta name=\"description\" content=\"Default\" />"),
            ("robots", "<meta name=\"robots\" content=\"index\" />"),
        ]
        .into_iter()
        .collect()
    }

    fn seo(store: &MemoryStore) -> Seo {
        Seo::new(true, store, store, store, Scheme::Https)
    }

    #[test]
    fn test_tagset_order_and_overwrite() {
        let mut tags = TagSet::new();
        tags.set("a", "1".to_owned());
        tags.set("b", "2".to_owned());
        tags.set("a", "3".to_owned());
        assert_eq!("3\n2", tags.join());
        assert_eq!(Some("3"), tags.get("a"));
        assert_eq!(2, tags.len());
    }

    #[test]
    fn test_no_page_passes_base_through() {
        let store = store();
        assert_eq!(base().join(), seo(&store).tags(base()));
    }

    #[test]
    fn test_backend_never_resolves() {
        let store = store_with_page(
            "  seo_title: Ignored\n  url: \"https://example.org/p/\"\n",
        );
        let seo = Seo::new(false, &store, &store, &store, Scheme::Https);
        assert_eq!("Default", seo.title("Default"));
        assert!(seo.page().is_none());
    }

    #[test]
    fn test_custom_title_tags() {
        let store = store_with_page(
            "  seo_title: \"Our <b>Products</b>\\nOverview\"\n  url: \"https://example.org/products/\"\n",
        );
        let output = seo(&store).tags(base());
        assert!(output.contains("<title>Our Products Overview</title>"));
        assert!(output
            .contains("<meta property=\"og:title\" content=\"Our Products Overview\" />"));
        assert!(output
            .contains("<meta name=\"twitter:title\" content=\"Our Products Overview\" />"));
        assert_eq!(1, output.matches("<title>").count());
    }

    #[test]
    fn test_without_custom_title_base_survives() {
        let store = store_with_page("  url: \"https://example.org/products/\"\n");
        let output = seo(&store).tags(base());
        assert!(output.contains("<title>Default</title>"));
        assert!(!output.contains("og:title"));
    }

    #[test]
    fn test_empty_title_counts_as_unset() {
        let store = store_with_page(
            "  seo_title: \"\"\n  url: \"https://example.org/products/\"\n",
        );
        let output = seo(&store).tags(base());
        assert!(output.contains("<title>Default</title>"));
    }

    #[test]
    fn test_canonical_triple() {
        let store =
            store_with_page("  url: \"http://example.org/products/?page=2\"\n");
        let output = seo(&store).tags(base());
        assert!(output
            .contains("<link rel=\"canonical\" href=\"https://example.org/products/\" />"));
        assert!(output
            .contains("<meta property=\"og:url\" content=\"https://example.org/products/\" />"));
        assert!(output
            .contains("<meta name=\"twitter:url\" content=\"https://example.org/products/\" />"));
    }

    #[test]
    fn test_hreflang_follows_registry_order() {
        let store = store_with_page(concat!(
            "  url: \"https://example.org/products/\"\n",
            "  hreflang:\n",
            "    - { clang_id: 3, url: \"https://example.org/fr/produits/\" }\n",
            "    - { clang_id: 2, url: \"https://example.org/en/products/\" }\n",
            "    - { clang_id: 1, url: \"https://example.org/produkte/\" }\n",
        ));
        let output = seo(&store).tags(base());
        let de = output.find("hreflang=\"de\"").unwrap();
        let en = output.find("hreflang=\"en\"").unwrap();
        assert!(de < en, "registry order: de before en");
        assert!(!output.contains("hreflang=\"fr\""), "offline language skipped");
    }

    #[test]
    fn test_card_defaults_to_summary() {
        let store = store_with_page("  url: \"https://example.org/products/\"\n");
        let output = seo(&store).tags(base());
        assert!(output.contains("<meta name=\"twitter:card\" content=\"summary\" />"));
        assert!(!output.contains("og:image"));
        assert!(!output.contains("twitter:image"));
        assert!(!output.contains("<meta name=\"image\""));
    }

    #[test]
    fn test_image_tags_from_first_resolvable_ref() {
        let store = store_with_page(concat!(
            "  seo_image: \"missing.jpg,cover.jpg\"\n",
            "  url: \"https://example.org/products/\"\n",
        ));
        let output = seo(&store).tags(base());
        assert!(output.contains(
            "<meta property=\"og:image\" content=\"https://example.org/media/cover.jpg\" />"
        ));
        assert!(output
            .contains("<meta name=\"twitter:card\" content=\"summary_large_image\" />"));
        assert!(output
            .contains("<meta property=\"og:image:width\" content=\"1200\" />"));
        assert!(output
            .contains("<meta property=\"og:image:height\" content=\"630\" />"));
    }

    #[test]
    fn test_image_without_dimensions_omits_size_tags() {
        let store = store_with_page(concat!(
            "  seo_image: plain.jpg\n",
            "  url: \"https://example.org/products/\"\n",
        ));
        let output = seo(&store).tags(base());
        assert!(output.contains("og:image"));
        assert!(!output.contains("og:image:width"));
        assert!(!output.contains("og:image:height"));
    }

    #[test]
    fn test_unresolvable_refs_are_skipped_silently() {
        let store = store_with_page(concat!(
            "  seo_image: \"missing.jpg,,also-missing.png\"\n",
            "  url: \"https://example.org/products/\"\n",
        ));
        let output = seo(&store).tags(base());
        assert!(!output.contains("og:image"));
        assert!(output.contains("<meta name=\"twitter:card\" content=\"summary\" />"));
    }

    #[test]
    fn test_hook_filter_runs_before_join() {
        let store = store_with_page("  url: \"https://example.org/products/\"\n");
        let mut seo = seo(&store);
        seo.hooks_mut().register("strip-robots", |mut tags| {
            tags.set("robots", "<meta name=\"robots\" content=\"noindex\" />".to_owned());
            tags
        });
        let output = seo.tags(base());
        assert!(output.contains("noindex"));
        assert!(!output.contains("content=\"index\""));
    }

    #[test]
    fn test_title_rewrite_combines() {
        let store = store_with_page(
            "  seo_title: Products\n  url: \"https://example.org/products/\"\n",
        );
        assert_eq!("Products / Site", seo(&store).title("Site"));
    }

    #[test]
    fn test_description_rewrite_replaces() {
        let store = store_with_page(
            "  seo_description: Better\n  url: \"https://example.org/products/\"\n",
        );
        assert_eq!("Better", seo(&store).description("Default"));
    }

    #[test]
    fn test_canonical_rewrite() {
        let store = store_with_page("  url: \"http://example.org/products/\"\n");
        assert_eq!(
            "https://example.org/products/",
            seo(&store).canonical("https://example.org/fallback/"),
        );
    }

    #[test]
    fn test_hreflang_rewrite_keeps_current_when_empty() {
        let store = store_with_page("  url: \"https://example.org/products/\"\n");
        let current = vec![("de".to_owned(), "https://example.org/x".to_owned())];
        assert_eq!(current, seo(&store).hreflang(&current));
    }

    #[test]
    fn test_images_rewrite_fills_empty_only() {
        let store = store_with_page(
            "  seo_image: cover.jpg\n  url: \"https://example.org/products/\"\n",
        );
        let seo = seo(&store);
        assert_eq!("cover.jpg", seo.images(""));
        assert_eq!("existing.png", seo.images("existing.png"));
    }
}
