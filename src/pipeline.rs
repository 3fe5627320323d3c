use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::{order_pages, Classification, ClassifyOptions};
use crate::clean::clean_text;
use crate::discover::discover_links;
use crate::fetch::{fetch_text, Fetch};

/// One documentation site: the entry page plus the host its output is named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub root: Url,
    host: String,
}

impl Site {
    /// Accepts a bare host (`book.cairo-lang.org`, served over https) or a full
    /// `http(s)://` URL.
    pub fn parse(domain: &str) -> Result<Self> {
        let domain = domain.trim();
        let root = match Url::parse(domain) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ if domain.contains("://") => {
                bail!("Site {:?} must use http or https", domain)
            }
            _ => Url::parse(&format!("https://{}", domain))
                .with_context(|| format!("Invalid site {:?}", domain))?,
        };
        let host = root
            .host_str()
            .with_context(|| format!("Site {:?} has no host", domain))?
            .to_string();
        Ok(Self { root, host })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.txt", self.host)
    }
}

#[derive(Debug, Serialize)]
pub struct PlannedPage {
    pub url: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Outcome of writing one site's file.
#[derive(Debug)]
pub struct SiteReport {
    pub host: String,
    pub output: PathBuf,
    pub pages: usize,
    pub failed: usize,
}

/// Discover, classify and order a site's pages. A failed entry page yields
/// no pages rather than an error.
pub async fn plan_site<F: Fetch + ?Sized>(
    fetcher: &F,
    site: &Site,
    opts: &ClassifyOptions,
) -> Vec<(Url, Classification)> {
    let links = match discover_links(fetcher, &site.root).await {
        Ok(links) => links,
        Err(e) => {
            warn!("Web scraping failed for {}: {}", site.root, e);
            Vec::new()
        }
    };
    let pages = order_pages(links, opts);
    info!("{}: {} chapter/appendix pages", site.host(), pages.len());
    pages
}

pub fn to_planned(pages: &[(Url, Classification)]) -> Vec<PlannedPage> {
    pages
        .iter()
        .map(|(url, class)| PlannedPage {
            url: url.to_string(),
            classification: *class,
        })
        .collect()
}

/// Write `<out_dir>/<host>.txt` for one site, overwriting any previous file.
///
/// Page fetch failures leave a bare `URL:` header and are counted in the
/// report; filesystem errors propagate.
pub async fn scrape_site<F: Fetch + ?Sized>(
    fetcher: &F,
    site: &Site,
    opts: &ClassifyOptions,
    out_dir: &Path,
) -> Result<SiteReport> {
    let pages = plan_site(fetcher, site, opts).await;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(site.output_file_name());
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut failed = 0usize;
    for (url, class) in &pages {
        pb.set_message(class.to_string());
        writeln!(out, "URL: {}", url)?;

        match fetch_text(fetcher, url).await {
            Ok(text) => {
                let cleaned = clean_text(&text);
                debug!("{}: {} bytes after cleaning", url, cleaned.len());
                out.write_all(cleaned.as_bytes())?;
                if !cleaned.is_empty() && !cleaned.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
            }
            Err(e) => {
                warn!("Failed to fetch text from {}: {}", url, e);
                failed += 1;
            }
        }
        pb.inc(1);
    }

    out.flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();

    info!(
        "Wrote {} pages ({} failed) to {}",
        pages.len(),
        failed,
        path.display()
    );

    Ok(SiteReport {
        host: site.host.clone(),
        output: path,
        pages: pages.len(),
        failed,
    })
}

/// Process each site in the order given, one at a time.
pub async fn scrape_sites<F: Fetch + ?Sized>(
    fetcher: &F,
    sites: &[Site],
    opts: &ClassifyOptions,
    out_dir: &Path,
) -> Result<Vec<SiteReport>> {
    let mut reports = Vec::with_capacity(sites.len());
    for site in sites {
        info!("Scraping {}", site.root);
        reports.push(scrape_site(fetcher, site, opts, out_dir).await?);
    }
    Ok(reports)
}
