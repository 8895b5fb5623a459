use crate::url::Scheme;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "seogen.yaml";

#[derive(Deserialize)]
struct Slots(usize);
impl Default for Slots {
    fn default() -> Self {
        // The sitemaps protocol allows 50k URLs per file.
        Slots(50000)
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    scheme: Scheme,

    #[serde(default)]
    sitemap_slots: Slots,

    data: PathBuf,
}

pub struct Config {
    /// The scheme stored URLs are solved against before output.
    pub scheme: Scheme,

    /// Slot budget handed to the budgeted sitemap collector.
    pub sitemap_slots: usize,

    /// The YAML fixture file holding profiles, languages, articles, media,
    /// and the optional current page.
    pub data_file: PathBuf,
}

impl Config {
    /// Finds `seogen.yaml` in `dir` or the nearest parent directory and
    /// loads it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                scheme: project.scheme,
                sitemap_slots: project.sitemap_slots.0,
                data_file: project_root.join(project.data),
            }),
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut project = File::create(dir.path().join(PROJECT_FILE))?;
        writeln!(project, "scheme: http")?;
        writeln!(project, "sitemap_slots: 10")?;
        writeln!(project, "data: fixtures.yaml")?;

        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(Scheme::Http, config.scheme);
        assert_eq!(10, config.sitemap_slots);
        assert_eq!(dir.path().join("fixtures.yaml"), config.data_file);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut project = File::create(dir.path().join(PROJECT_FILE))?;
        writeln!(project, "data: fixtures.yaml")?;

        let config = Config::from_directory(dir.path())?;
        assert_eq!(Scheme::Https, config.scheme);
        assert_eq!(50000, config.sitemap_slots);
        Ok(())
    }
}
