use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, SubCommand};
use seogen::config::Config;
use seogen::memory::MemoryStore;
use seogen::sitemap::{self, SitemapContext};
use seogen::tags::{Seo, TagSet};
use seogen::url::Scheme;
use std::fs::File;
use std::io;
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = App::new("seogen")
        .about("Preview SEO tags and sitemaps from YAML fixture data")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .takes_value(true)
                .help("Project directory (defaults to the current directory)"),
        )
        .subcommand(
            SubCommand::with_name("tags")
                .about("Render the head tags for the fixture's current page"),
        )
        .subcommand(
            SubCommand::with_name("sitemap")
                .about("Render the full sitemap document to stdout"),
        )
        .subcommand(
            SubCommand::with_name("entries")
                .about("Render budgeted entries as standalone <url> fragments"),
        )
        .get_matches();

    let dir = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = Config::from_directory(&dir)?;
    let store = MemoryStore::from_reader(open_data(&config)?)?;

    match matches.subcommand_name() {
        Some("tags") => render_tags(&store, config.scheme),
        Some("sitemap") => render_sitemap(&store, config.scheme)?,
        Some("entries") => render_entries(&store, &config)?,
        _ => unreachable!(), // SubcommandRequiredElseHelp
    }
    Ok(())
}

fn open_data(config: &Config) -> Result<File> {
    File::open(&config.data_file).map_err(|e| {
        anyhow!(
            "Opening data file `{}`: {}",
            config.data_file.display(),
            e
        )
    })
}

fn render_tags(store: &MemoryStore, scheme: Scheme) {
    let seo = Seo::new(true, store, store, store, scheme);
    println!("{}", seo.tags(TagSet::new()));
}

fn context(store: &MemoryStore, scheme: Scheme) -> SitemapContext {
    SitemapContext {
        profiles: store,
        languages: store,
        articles: store,
        media: store,
        scheme,
    }
}

fn render_sitemap(store: &MemoryStore, scheme: Scheme) -> Result<()> {
    let entries = sitemap::full_entries(&context(store, scheme));
    let stdout = io::stdout();
    sitemap::write_urlset(stdout.lock(), &entries)?;
    println!();
    Ok(())
}

fn render_entries(store: &MemoryStore, config: &Config) -> Result<()> {
    let entries = sitemap::collect_entries(&context(store, config.scheme), config.sitemap_slots);
    for fragment in sitemap::entry_fragments(&entries)? {
        println!("{}", fragment);
    }
    Ok(())
}
