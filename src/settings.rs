use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::classify::ClassifyOptions;
use crate::pipeline::Site;

const DEFAULT_DOMAINS: &[&str] = &["book.cairo-lang.org", "book.starknet.io"];
const DEFAULT_CONFIG_NAME: &str = "doc_scrape";
const ENV_PREFIX: &str = "DOC_SCRAPE";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub domains: Vec<String>,
    pub include_appendix: bool,
    pub min_chapter: u32,
    pub max_chapter: u32,
    pub output_dir: PathBuf,
}

/// Values given on the command line. `None` or empty leaves the layered value alone.
#[derive(Debug, Default)]
pub struct Overrides {
    pub domains: Vec<String>,
    pub no_appendix: bool,
    pub min_chapter: Option<u32>,
    pub max_chapter: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

impl Settings {
    /// Defaults, then the config file, then `DOC_SCRAPE_*` environment variables.
    ///
    /// Without an explicit path, `doc_scrape.{toml,json,yaml}` in the working
    /// directory is read if present.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_from(config_path, None)
    }

    fn load_from(
        config_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = Config::builder()
            .set_default("domains", DEFAULT_DOMAINS.to_vec())?
            .set_default("include_appendix", true)?
            .set_default("min_chapter", 1_i64)?
            .set_default("max_chapter", 10_i64)?
            .set_default("output_dir", ".")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("domains")
                    .source(env),
            )
            .build()
            .context("Failed to load settings")?;

        let settings: Settings = settings
            .try_deserialize()
            .context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if !overrides.domains.is_empty() {
            self.domains = overrides.domains;
        }
        if overrides.no_appendix {
            self.include_appendix = false;
        }
        if let Some(min) = overrides.min_chapter {
            self.min_chapter = min;
        }
        if let Some(max) = overrides.max_chapter {
            self.max_chapter = max;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.domains.is_empty() {
            bail!("No domains configured");
        }
        if self.min_chapter > self.max_chapter {
            bail!(
                "min_chapter ({}) is greater than max_chapter ({})",
                self.min_chapter,
                self.max_chapter
            );
        }
        Ok(())
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            include_appendix: self.include_appendix,
            min_chapter: self.min_chapter,
            max_chapter: self.max_chapter,
        }
    }

    /// Parse the configured domains. Two sites writing the same output file
    /// is a configuration error.
    pub fn sites(&self) -> Result<Vec<Site>> {
        let sites: Vec<Site> = self
            .domains
            .iter()
            .map(|d| Site::parse(d))
            .collect::<Result<_>>()?;

        let mut seen = HashSet::new();
        for site in &sites {
            if !seen.insert(site.output_file_name()) {
                bail!(
                    "More than one site writes {} (second is {})",
                    site.output_file_name(),
                    site.root
                );
            }
        }
        Ok(sites)
    }
}
