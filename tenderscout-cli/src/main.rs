//! `tenderscout` command-line runner.

use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use tenderscout::prelude::*;

/// Exit status for unusable configuration.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Listing pages to read per site
    #[arg(long, env = "PAGES")]
    pages: Option<u32>,

    /// Detail pages to sample per site
    #[arg(long, env = "DETAIL_LIMIT")]
    detail_limit: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, env = "TIMEOUT")]
    timeout: Option<f64>,

    /// Write only included records to the filtered artifact
    #[arg(long, env = "ONLY_FILTERED", value_parser = BoolishValueParser::new())]
    only_filtered: Option<bool>,

    /// Require a primary-term hit for inclusion
    #[arg(long, env = "STRICT_REQUIRED", value_parser = BoolishValueParser::new())]
    strict_required: Option<bool>,

    /// Write near-miss artifacts for sites that enable them
    #[arg(long, env = "WRITE_NEAR", value_parser = BoolishValueParser::new())]
    write_near: Option<bool>,

    /// Parallel detail fetches per site
    #[arg(long, env = "DETAIL_WORKERS")]
    detail_workers: Option<usize>,

    /// Concurrent requests allowed per host across all sites
    #[arg(long, env = "HOST_CONCURRENCY")]
    host_concurrency: Option<usize>,

    /// Artifact directory
    #[arg(long, env = "OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Base run configuration (TOML); flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site profiles (TOML with [[site]] tables) instead of the built-in ones
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Term taxonomy (TOML) instead of the built-in one
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Run only these sites (can be repeated)
    #[arg(long = "site")]
    sites: Vec<String>,

    /// Log as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

impl Args {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_toml_str(&read(path)?)
                .with_context(|| format!("invalid run configuration in {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(pages) = self.pages {
            config.pages = pages;
        }
        if let Some(limit) = self.detail_limit {
            config.detail_limit = limit;
        }
        if let Some(timeout) = self.timeout {
            config.fetch.timeout_seconds = timeout;
        }
        if let Some(flag) = self.only_filtered {
            config.only_filtered = flag;
        }
        if let Some(flag) = self.strict_required {
            config.strict_required = flag;
        }
        if let Some(flag) = self.write_near {
            config.write_near = flag;
        }
        if let Some(workers) = self.detail_workers {
            config.detail_workers = workers;
        }
        if let Some(limit) = self.host_concurrency {
            config.host_concurrency = limit;
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir.clone_from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    fn site_profiles(&self) -> Result<Vec<SiteProfile>> {
        let profiles = match &self.profiles {
            Some(path) => load_profiles(&read(path)?)
                .with_context(|| format!("invalid site profiles in {}", path.display()))?,
            None => builtin_profiles(),
        };
        select_sites(profiles, &self.sites)
    }

    fn term_taxonomy(&self) -> Result<TermTaxonomy> {
        match &self.taxonomy {
            Some(path) => TermTaxonomy::from_toml_str(&read(path)?)
                .with_context(|| format!("invalid taxonomy in {}", path.display())),
            None => Ok(TermTaxonomy::builtin()?),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Keeps the requested sites, matched case-insensitively, in profile order.
fn select_sites(profiles: Vec<SiteProfile>, wanted: &[String]) -> Result<Vec<SiteProfile>> {
    if wanted.is_empty() {
        return Ok(profiles);
    }
    if let Some(unknown) = wanted
        .iter()
        .find(|w| !profiles.iter().any(|p| p.id.eq_ignore_ascii_case(w)))
    {
        let known: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
        bail!("unknown site '{unknown}' (known: {})", known.join(", "));
    }
    Ok(profiles
        .into_iter()
        .filter(|p| wanted.iter().any(|w| p.id.eq_ignore_ascii_case(w)))
        .collect())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

struct Prepared {
    context: RunContext,
    profiles: Vec<SiteProfile>,
}

fn prepare(args: &Args) -> Result<Prepared> {
    let config = args.run_config()?;
    let profiles = args.site_profiles()?;
    let taxonomy = Arc::new(args.term_taxonomy()?);
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch).context("failed to build HTTP client")?);

    info!(
        pages = config.pages,
        detail_limit = config.detail_limit,
        out_dir = %config.output_dir.display(),
        sites = profiles.len(),
        "Configuration loaded"
    );
    let context = RunContext::new(config, fetcher, taxonomy)?
        .with_events(Arc::new(LoggingEventSink::debug()));
    Ok(Prepared { context, profiles })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_json);

    let Prepared { context, profiles } = match prepare(&args) {
        Ok(prepared) => prepared,
        Err(err) => {
            error!("Invalid configuration: {err:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let summary = run_batch(Arc::new(context), profiles).await;
    for site in &summary.sites {
        match &site.outcome {
            SiteOutcome::Failed(reason) => {
                error!(site = %site.site, reason = %reason, "Site failed");
            }
            outcome => info!(
                site = %site.site,
                outcome = outcome.as_str(),
                raw = site.raw_count,
                filtered = site.filtered_count,
                near = site.near_count,
                fallback = site.fallback_used,
                "Site summary"
            ),
        }
    }
    if summary.is_failure() {
        warn!(run_id = %summary.run_id, "Run failed");
    }
    ExitCode::from(summary.exit_code())
}
