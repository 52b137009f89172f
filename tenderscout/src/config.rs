//! Configuration types for a discovery run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Result, ScoutError};

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> f64 {
    20.0
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0 Safari/537.36 tenderscout/0.1"
        .to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// A fixed delay plus a uniformly random jitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelayConfig {
    /// Fixed part in milliseconds.
    pub base_ms: u64,
    /// Upper bound of the random part in milliseconds.
    pub jitter_ms: u64,
}

impl DelayConfig {
    /// Creates a delay.
    #[must_use]
    pub const fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// No delay at all.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Draws one delay.
    #[must_use]
    pub fn sample(&self) -> Duration {
        use rand::Rng;

        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };
        Duration::from_millis(self.base_ms.saturating_add(jitter))
    }
}

/// Courtesy delays between requests to the same host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolitenessConfig {
    /// Delay around listing-page requests.
    #[serde(default = "default_listing_delay")]
    pub listing: DelayConfig,
    /// Delay around detail-page requests.
    #[serde(default = "default_detail_delay")]
    pub detail: DelayConfig,
}

fn default_listing_delay() -> DelayConfig {
    DelayConfig::new(300, 300)
}

fn default_detail_delay() -> DelayConfig {
    DelayConfig::new(200, 200)
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            listing: default_listing_delay(),
            detail: default_detail_delay(),
        }
    }
}

impl PolitenessConfig {
    /// Disables all delays. Used by tests and local fixtures.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            listing: DelayConfig::none(),
            detail: DelayConfig::none(),
        }
    }
}

/// Process-wide knobs for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Listing pages to scan per site.
    #[serde(default = "default_pages")]
    pub pages: u32,
    /// How many detail pages to sample per site.
    #[serde(default = "default_detail_limit")]
    pub detail_limit: usize,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Emit only included records in the filtered artifact.
    #[serde(default = "default_true")]
    pub only_filtered: bool,
    /// Require a primary-signal hit for inclusion.
    #[serde(default = "default_true")]
    pub strict_required: bool,
    /// Write the near-miss artifact for sites that have one.
    #[serde(default = "default_true")]
    pub write_near: bool,
    /// Concurrent detail fetches per site.
    #[serde(default = "default_detail_workers")]
    pub detail_workers: usize,
    /// Concurrent requests allowed per host.
    #[serde(default = "default_host_concurrency")]
    pub host_concurrency: usize,
    /// Courtesy delays.
    #[serde(default)]
    pub politeness: PolitenessConfig,
    /// Records kept by the top-N fallback.
    #[serde(default = "default_fallback_top_n")]
    pub fallback_top_n: usize,
    /// Maximum candidate links in the diagnostic dump.
    #[serde(default = "default_diagnostics_cap")]
    pub diagnostics_cap: usize,
    /// Directory receiving the artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_pages() -> u32 {
    2
}

fn default_detail_limit() -> usize {
    40
}

fn default_true() -> bool {
    true
}

fn default_detail_workers() -> usize {
    4
}

fn default_host_concurrency() -> usize {
    2
}

fn default_fallback_top_n() -> usize {
    20
}

fn default_diagnostics_cap() -> usize {
    200
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pages: default_pages(),
            detail_limit: default_detail_limit(),
            fetch: FetchConfig::default(),
            only_filtered: true,
            strict_required: true,
            write_near: true,
            detail_workers: default_detail_workers(),
            host_concurrency: default_host_concurrency(),
            politeness: PolitenessConfig::default(),
            fallback_top_n: default_fallback_top_n(),
            diagnostics_cap: default_diagnostics_cap(),
            output_dir: default_output_dir(),
        }
    }
}

impl RunConfig {
    /// Creates a new run configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of listing pages.
    #[must_use]
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    /// Sets the detail sample cap.
    #[must_use]
    pub fn with_detail_limit(mut self, limit: usize) -> Self {
        self.detail_limit = limit;
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the politeness delays.
    #[must_use]
    pub fn with_politeness(mut self, politeness: PolitenessConfig) -> Self {
        self.politeness = politeness;
        self
    }

    /// Checks the knobs that would otherwise make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.pages == 0 {
            return Err(ScoutError::config("pages must be a positive integer"));
        }
        if !(self.fetch.timeout_seconds.is_finite() && self.fetch.timeout_seconds > 0.0) {
            return Err(ScoutError::config("timeout must be a positive number of seconds"));
        }
        if Duration::try_from_secs_f64(self.fetch.timeout_seconds).is_err() {
            return Err(ScoutError::config(format!(
                "timeout of {} seconds is out of range",
                self.fetch.timeout_seconds
            )));
        }
        if self.detail_workers == 0 {
            return Err(ScoutError::config("detail_workers must be at least 1"));
        }
        if self.host_concurrency == 0 {
            return Err(ScoutError::config("host_concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Parses a run configuration from TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }
}
