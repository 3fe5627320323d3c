mod classify;
mod clean;
mod discover;
mod fetch;
mod pipeline;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use fetch::HttpFetcher;
use pipeline::PlannedPage;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "doc_scrape",
    about = "Collect the chapter pages of book-style documentation sites into text files"
)]
struct Cli {
    /// Settings file (default: doc_scrape.toml in the working directory, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SiteArgs {
    /// Site to scrape, repeatable; replaces the configured list
    #[arg(short, long = "domain")]
    domains: Vec<String>,
    /// Skip appendix pages
    #[arg(long)]
    no_appendix: bool,
    /// Lowest chapter number to keep
    #[arg(long)]
    min_chapter: Option<u32>,
    /// Highest chapter number to keep
    #[arg(long)]
    max_chapter: Option<u32>,
}

impl SiteArgs {
    fn into_overrides(self, output_dir: Option<PathBuf>) -> Overrides {
        Overrides {
            domains: self.domains,
            no_appendix: self.no_appendix,
            min_chapter: self.min_chapter,
            max_chapter: self.max_chapter,
            output_dir,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured site and write one <domain>.txt per site
    Run {
        #[command(flatten)]
        site: SiteArgs,
        /// Directory for the output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Show which pages would be scraped, in order, without fetching them
    Plan {
        #[command(flatten)]
        site: SiteArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Collapse blank-line runs in a local text file and print the result
    Clean {
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct SitePlan {
    site: String,
    pages: Vec<PlannedPage>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { site, output_dir } => {
            let settings =
                Settings::load(cli.config.as_deref())?.apply(site.into_overrides(output_dir))?;
            let sites = settings.sites()?;
            let fetcher = HttpFetcher::new();

            let reports = pipeline::scrape_sites(
                &fetcher,
                &sites,
                &settings.classify_options(),
                &settings.output_dir,
            )
            .await?;

            for r in &reports {
                println!(
                    "{}: {} pages ({} failed) -> {}",
                    r.host,
                    r.pages,
                    r.failed,
                    r.output.display()
                );
            }

            let elapsed = t0.elapsed();
            if elapsed.as_secs() >= 1 {
                println!("\nDone in {}", format_duration(elapsed));
            }
        }
        Commands::Plan { site, json } => {
            let settings = Settings::load(cli.config.as_deref())?.apply(site.into_overrides(None))?;
            let opts = settings.classify_options();
            let fetcher = HttpFetcher::new();

            let mut plans = Vec::new();
            for site in settings.sites()? {
                let pages = pipeline::plan_site(&fetcher, &site, &opts).await;
                if !json {
                    println!("{} ({} pages)", site.root, pages.len());
                    for (i, (url, class)) in pages.iter().enumerate() {
                        println!("{:>4} | {:<14} | {}", i + 1, class.to_string(), url);
                    }
                    println!();
                }
                plans.push(SitePlan {
                    site: site.root.to_string(),
                    pages: pipeline::to_planned(&pages),
                });
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            }
        }
        Commands::Clean { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            print!("{}", clean::clean_text(&text));
        }
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
