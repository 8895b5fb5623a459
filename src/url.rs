use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::{ParseError, Url};

/// The scheme a site is served under. URLs coming out of the CMS may carry
/// whatever scheme they were stored with; before embedding them in tags or
/// sitemap entries they are "solved" against the configured site scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme::Https
    }
}

/// A page URL as the CMS hands it to us. Wraps [`Url`] and exposes the
/// handful of views the tag assembler and the sitemap builders need.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PageUrl {
    inner: Url,
}

impl PageUrl {
    pub fn parse(input: &str) -> Result<PageUrl, ParseError> {
        Ok(PageUrl {
            inner: Url::parse(input)?,
        })
    }

    /// Replaces the stored scheme with the site scheme. Stored URLs keep
    /// whatever scheme they were generated under; output always uses the
    /// configured one.
    pub fn solve_scheme(&mut self, scheme: Scheme) {
        // `set_scheme` only fails for special/non-special crossings, which
        // can't happen for http <-> https.
        let _ = self.inner.set_scheme(scheme.as_str());
    }

    /// Returns a copy with the scheme solved against `scheme`.
    pub fn solved(&self, scheme: Scheme) -> PageUrl {
        let mut url = self.clone();
        url.solve_scheme(scheme);
        url
    }

    /// The `scheme://host[:port]` prefix, without a trailing slash.
    pub fn scheme_and_host(&self) -> String {
        self.inner.origin().ascii_serialization()
    }

    /// The path component as stored, percent-encoding intact.
    pub fn path(&self) -> &str {
        self.inner.path()
    }

    /// The path component with percent-encoding decoded. Sitemap locations
    /// are emitted decoded; the XML writer re-escapes what needs escaping.
    pub fn decoded_path(&self) -> String {
        percent_decode_str(self.inner.path())
            .decode_utf8_lossy()
            .into_owned()
    }

    /// `scheme_and_host` + the raw path, dropping any query or fragment.
    pub fn without_query(&self) -> String {
        format!("{}{}", self.scheme_and_host(), self.path())
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}
