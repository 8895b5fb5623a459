//! The library code for the `seogen` SEO generator. The architecture can be
//! generally broken down into two distinct responsibilities:
//!
//! 1. Assembling the SEO head tags for the currently-resolved page
//!    ([`crate::tags`])
//! 2. Assembling sitemap entries from the configured URL profiles and
//!    serializing them as XML ([`crate::sitemap`])
//!
//! Both are thin transformations over externally-owned data: the host CMS
//! owns the profiles, languages, articles, and media, and hands them to this
//! crate through the store traits in [`crate::store`] (plus the page-resolver
//! trait in [`crate::page`]). Lookups that come back empty are handled by
//! skipping the affected output, never by erroring--the only fallible surface
//! is XML serialization itself.
//!
//! The [`crate::memory`] module provides a YAML-backed implementation of
//! every store trait. It backs the preview binary and the test suite; real
//! deployments implement the traits against the CMS registries instead.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod memory;
pub mod page;
pub mod sanitize;
pub mod sitemap;
pub mod store;
pub mod tags;
pub mod url;
