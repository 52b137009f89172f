//! # Tenderscout
//!
//! Adaptive discovery and relevance classification of public tender
//! listings.
//!
//! For each configured portal, tenderscout:
//!
//! - **Locates** a listing endpoint by probing candidate hosts and paths
//! - **Extracts** detail links with several complementary strategies
//! - **Paginates** with duplicate-page detection
//! - **Samples** detail pages under bounded, per-host concurrency
//! - **Scores and classifies** each opportunity against a keyword taxonomy
//! - **Writes** raw, filtered and near-miss JSON artifacts
//!
//! Portals differ only in their [`profile::SiteProfile`]; one engine runs
//! them all.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tenderscout::prelude::*;
//!
//! let config = RunConfig::default();
//! let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
//! let taxonomy = Arc::new(TermTaxonomy::builtin()?);
//! let context = Arc::new(RunContext::new(config, fetcher, taxonomy)?);
//!
//! let summary = run_batch(context, builtin_profiles()).await;
//! std::process::exit(i32::from(summary.exit_code()));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod opportunity;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod scoring;
pub mod taxonomy;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DelayConfig, FetchConfig, PolitenessConfig, RunConfig};
    pub use crate::errors::{Result, ScoutError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::extract::{CandidateLink, DetailText, DiscoveryMethod, ExtractorSet};
    pub use crate::fetch::{FetchResult, Fetcher, HostLimiter, HttpFetcher, ThrottledFetcher};
    pub use crate::opportunity::{ScoredOpportunity, UniqueOpportunity};
    pub use crate::output::{ArtifactSink, CollectingSink, DirectorySink};
    pub use crate::pipeline::{
        run_batch, BatchSummary, RunContext, SiteEngine, SiteOutcome, SiteReport,
    };
    pub use crate::profile::{builtin_profiles, load_profiles, DetailLinkRule, SiteProfile};
    pub use crate::scoring::{Assessment, Classification, InclusionPolicy, RelevanceScorer};
    pub use crate::taxonomy::{TermCategory, TermTaxonomy};
    pub use std::sync::Arc;
}
