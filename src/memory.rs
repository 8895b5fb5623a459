//! An in-memory implementation of every store trait, deserialized from YAML.
//! The preview binary feeds it a fixture file; tests build it from literals.
//! A real deployment implements the traits against the CMS registries
//! instead.

use crate::page::{PageContext, PageResolver};
use crate::store::{
    Article, ArticleId, ArticleStore, LangId, Language, LanguageStore, MediaAsset, MediaStore,
    Profile, ProfileStore,
};
use serde::Deserialize;
use std::io;

#[derive(Debug, Default, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub languages: Vec<Language>,

    #[serde(default)]
    pub articles: Vec<Article>,

    #[serde(default)]
    pub media: Vec<MediaAsset>,

    #[serde(default)]
    pub profiles: Vec<Profile>,

    /// The "current page" the tag assembler should see, if any.
    #[serde(default)]
    pub page: Option<PageContext>,
}

impl MemoryStore {
    pub fn from_yaml(input: &str) -> Result<MemoryStore, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<MemoryStore, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}

impl ProfileStore for MemoryStore {
    fn all(&self) -> Vec<Profile> {
        self.profiles.clone()
    }
}

impl LanguageStore for MemoryStore {
    fn get(&self, id: LangId) -> Option<Language> {
        self.languages.iter().find(|l| l.id == id).cloned()
    }

    fn online_ids(&self) -> Vec<LangId> {
        self.languages
            .iter()
            .filter(|l| l.online)
            .map(|l| l.id)
            .collect()
    }
}

impl ArticleStore for MemoryStore {
    fn get(&self, article_id: ArticleId, clang_id: LangId) -> Option<Article> {
        self.articles
            .iter()
            .find(|a| a.id == article_id && a.clang_id == clang_id)
            .cloned()
    }
}

impl MediaStore for MemoryStore {
    fn get(&self, name: &str) -> Option<MediaAsset> {
        self.media.iter().find(|m| m.name == name).cloned()
    }
}

impl PageResolver for MemoryStore {
    fn resolve_current(&self) -> Option<PageContext> {
        self.page.clone()
    }
}
