//! Site pipeline and batch orchestration.
//!
//! This module provides:
//! - `ListingLocator`: probes candidate listing endpoints
//! - `ListingWalker`: reads listing pages with duplicate-page detection
//! - `Aggregator`: first-seen deduplication across pages
//! - `DetailSampler`: bounded parallel detail fetching
//! - `SiteEngine`: the full per-site pipeline
//! - `run_batch`: concurrent execution of several sites

mod aggregate;
mod batch;
mod context;
mod engine;
mod locator;
mod paginator;
mod report;
mod sampler;
mod walk;

pub use aggregate::Aggregator;
pub use batch::run_batch;
pub use context::RunContext;
pub use engine::SiteEngine;
pub use locator::{LocateReport, LocatedListing, ListingLocator, ListingPage, ProbeCapture};
pub use paginator::page_url;
pub use report::{BatchSummary, SiteOutcome, SiteReport};
pub use sampler::DetailSampler;
pub use walk::{ListingWalk, ListingWalker, WalkStop};
