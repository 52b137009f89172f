//! Named pipeline events.
//!
//! Milestones are logged through `tracing` by the components themselves and
//! also emitted through an [`EventSink`], which tests use to assert on what
//! the pipeline did without scraping log output.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// One listing candidate was fetched and examined.
pub const SITE_PROBE: &str = "site.probe";
/// A listing endpoint yielding detail links was chosen.
pub const SITE_LOCATED: &str = "site.located";
/// No listing candidate yielded detail links.
pub const SITE_LAYOUT_MISMATCH: &str = "site.layout_mismatch";
/// Every listing candidate failed to fetch.
pub const SITE_TRANSPORT_UNAVAILABLE: &str = "site.transport_unavailable";
/// One listing page was walked.
pub const LISTING_PAGE: &str = "listing.page";
/// A page repeated the previous page's links; the walk stopped.
pub const LISTING_DUPLICATE_PAGE: &str = "listing.duplicate_page";
/// A listing page could not be fetched; the walk skipped it.
pub const LISTING_PAGE_FAILED: &str = "listing.page_failed";
/// A page after the first was served without detail links; the walk stopped.
pub const LISTING_EXHAUSTED: &str = "listing.exhausted";
/// Detail sampling finished.
pub const DETAIL_SAMPLED: &str = "detail.sampled";
/// Nothing passed inclusion; the top-N fallback was used.
pub const CLASSIFY_FALLBACK: &str = "classify.fallback";
/// A site pipeline finished and its artifacts were written.
pub const SITE_COMPLETED: &str = "site.completed";
/// A site pipeline failed.
pub const SITE_FAILED: &str = "site.failed";
