//! Sitemap assembly. Two entry points exist because the host CMS consumes
//! sitemaps two ways:
//!
//! * [`collect_entries`] feeds an external sitemap composer that tracks a
//!   remaining-slot budget across many sources. It checks a fixed-language
//!   profile once, caps output at the budget, and stops iterating the moment
//!   the budget is spent.
//! * [`full_entries`] renders the whole site standalone. It applies no
//!   budget, and for "all languages" profiles it gates every URL on its own
//!   language and article state.
//!
//! Both produce [`SitemapEntry`] records; all XML passes through the same
//! writer ([`write_urlset`], [`entry_fragments`]) so escaping lives in
//! exactly one place.

use crate::sanitize;
use crate::store::{
    ArticleId, ArticleStore, ChangeFrequency, LangId, LanguageStore, MediaStore, Profile,
    ProfileStore, ProfileUrl,
};
use crate::url::{PageUrl, Scheme};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::io;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";

/// One `<image:image>` sub-entry. `title` is already tag-stripped; XML
/// escaping happens in the writer.
#[derive(Clone, Debug, PartialEq)]
pub struct SitemapImage {
    pub loc: String,
    pub title: Option<String>,
}

/// One `<url>` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: ChangeFrequency,
    pub priority: f32,
    pub images: Vec<SitemapImage>,
}

/// The collaborator registries sitemap generation reads. All lookups are
/// read-only; "not found" means skip, never error.
pub struct SitemapContext<'a> {
    pub profiles: &'a dyn ProfileStore,
    pub languages: &'a dyn LanguageStore,
    pub articles: &'a dyn ArticleStore,
    pub media: &'a dyn MediaStore,
    pub scheme: Scheme,
}

/// Collects entries against a remaining-slot budget. Profiles and their URLs
/// are visited in registry order; the budget is a hard global cap, and
/// iteration halts entirely once it is spent, before the next URL is even
/// examined.
pub fn collect_entries(cx: &SitemapContext, free_slots: usize) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();
    if free_slots == 0 {
        return entries;
    }

    let mut slots = free_slots;
    'profiles: for profile in cx.profiles.all() {
        if !profile.in_sitemap {
            continue;
        }

        if let Some(clang_id) = profile.article_clang_id {
            if !fixed_language_ok(cx, &profile, clang_id) {
                continue;
            }
        }

        for profile_url in &profile.urls {
            if !profile_url.sitemap {
                continue;
            }

            let url = profile_url.url.solved(cx.scheme);
            entries.push(SitemapEntry {
                loc: location(&url),
                lastmod: profile_url.lastmod,
                changefreq: profile.sitemap_frequency,
                priority: profile.sitemap_priority,
                images: image_entries(cx, profile_url, &url),
            });

            slots -= 1;
            if slots == 0 {
                break 'profiles;
            }
        }
    }
    entries
}

/// Collects every eligible entry with no slot budget. A profile bound to a
/// fixed language is checked once, like [`collect_entries`]; an "all
/// languages" profile is instead gated per URL on the URL's own language and
/// the bound article in that language. Structural URLs additionally require
/// their backing article to be online and permitted.
pub fn full_entries(cx: &SitemapContext) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();
    let online = cx.languages.online_ids();

    for profile in cx.profiles.all() {
        if !profile.in_sitemap {
            continue;
        }

        let fixed = profile.article_clang_id;
        if let Some(clang_id) = fixed {
            if !fixed_language_ok(cx, &profile, clang_id) {
                continue;
            }
        }

        for profile_url in &profile.urls {
            if !profile_url.sitemap {
                continue;
            }

            if fixed.is_none() {
                if !online.contains(&profile_url.clang_id) {
                    continue;
                }
                if !article_ok(cx, profile.article_id, profile_url.clang_id) {
                    continue;
                }
            }

            if profile_url.structure
                && !article_ok(cx, profile_url.article_id, profile_url.clang_id)
            {
                continue;
            }

            let url = profile_url.url.solved(cx.scheme);
            entries.push(SitemapEntry {
                loc: location(&url),
                lastmod: profile_url.lastmod,
                changefreq: profile.sitemap_frequency,
                priority: profile.sitemap_priority,
                images: first_image(cx, profile_url, &url).into_iter().collect(),
            });
        }
    }
    entries
}

fn location(url: &PageUrl) -> String {
    format!("{}{}", url.scheme_and_host(), url.decoded_path())
}

fn fixed_language_ok(cx: &SitemapContext, profile: &Profile, clang_id: LangId) -> bool {
    match cx.languages.get(clang_id) {
        Some(language) if language.online => article_ok(cx, profile.article_id, clang_id),
        // Unknown ids are treated like offline languages.
        _ => false,
    }
}

fn article_ok(cx: &SitemapContext, article_id: ArticleId, clang_id: LangId) -> bool {
    match cx.articles.get(article_id, clang_id) {
        Some(article) => article.online && article.permitted,
        None => false,
    }
}

// The budgeted collector takes every image ref: split on comma, drop empties
// and duplicates, resolve, and keep only refs that are actually images.
fn image_entries(cx: &SitemapContext, profile_url: &ProfileUrl, url: &PageUrl) -> Vec<SitemapImage> {
    let refs = match &profile_url.seo_image {
        Some(refs) => refs,
        None => return Vec::new(),
    };

    let mut seen: Vec<&str> = Vec::new();
    let mut images = Vec::new();
    for name in refs.split(',') {
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        seen.push(name);

        let media = match cx.media.get(name) {
            Some(media) => media,
            None => continue,
        };
        if !media.is_image() {
            continue;
        }
        images.push(SitemapImage {
            loc: format!("{}{}", url.scheme_and_host(), media.url),
            title: image_title(&media.title),
        });
    }
    images
}

// The full renderer only ever considers the first listed ref, and accepts
// any media kind. A first ref that fails to resolve means no image at all.
fn first_image(
    cx: &SitemapContext,
    profile_url: &ProfileUrl,
    url: &PageUrl,
) -> Option<SitemapImage> {
    let refs = profile_url.seo_image.as_deref()?;
    let media = cx.media.get(refs.split(',').next()?)?;
    Some(SitemapImage {
        loc: format!("{}{}", url.scheme_and_host(), media.url),
        title: image_title(&media.title),
    })
}

fn image_title(title: &str) -> Option<String> {
    let title = sanitize::strip_tags(title);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Writes a complete sitemap document: XML declaration, `<urlset>` with the
/// sitemap and image namespaces, one `<url>` per entry.
pub fn write_urlset<W: io::Write>(w: W, entries: &[SitemapEntry]) -> Result<()> {
    let mut writer = Writer::new_with_indent(w, b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    urlset.push_attribute(("xmlns:image", IMAGE_NS));
    writer.write_event(Event::Start(urlset))?;

    for entry in entries {
        write_entry(&mut writer, entry)?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    Ok(())
}

/// Serializes each entry into a standalone `<url>` fragment, for callers
/// that splice entries into an externally-owned document.
pub fn entry_fragments(entries: &[SitemapEntry]) -> Result<Vec<String>> {
    let mut fragments = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut buf = Vec::new();
        write_entry(&mut Writer::new_with_indent(&mut buf, b'\t', 1), entry)?;
        fragments.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(fragments)
}

fn write_entry<W: io::Write>(writer: &mut Writer<W>, entry: &SitemapEntry) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("url")))?;
    write_text(writer, "loc", &entry.loc)?;
    write_text(
        writer,
        "lastmod",
        &entry.lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;
    for image in &entry.images {
        writer.write_event(Event::Start(BytesStart::new("image:image")))?;
        write_text(writer, "image:loc", &image.loc)?;
        if let Some(title) = &image.title {
            write_text(writer, "image:title", title)?;
        }
        writer.write_event(Event::End(BytesEnd::new("image:image")))?;
    }
    write_text(writer, "changefreq", entry.changefreq.as_str())?;
    write_text(writer, "priority", &entry.priority.to_string())?;
    writer.write_event(Event::End(BytesEnd::new("url")))?;
    Ok(())
}

// Text content is escaped here, by the writer, and nowhere else.
fn write_text<W: io::Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// The result of a fallible serialization operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem serializing sitemap XML. Collection itself never
/// fails; missing collaborator data is skipped, not surfaced.
#[derive(Debug)]
pub enum Error {
    /// Returned when the underlying writer fails.
    Io(io::Error),

    /// Returned when the XML writer rejects an event.
    Xml(quick_xml::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Xml(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Xml(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible serialization operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<quick_xml::Error> for Error {
    /// Converts [`quick_xml::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible serialization operations.
    fn from(err: quick_xml::Error) -> Error {
        Error::Xml(err)
    }
}
