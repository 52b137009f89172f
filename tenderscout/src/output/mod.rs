//! Output artifacts.
//!
//! Per site: `<stem>-raw.json`, `<stem>-links.json`, optionally
//! `<stem>-near.json`, and for diagnostic sites `<stem>-listing.html` and
//! `<stem>-debug-anchors.json`. All JSON is pretty-printed UTF-8.

mod records;
mod sink;
mod writer;

pub use records::{DebugCandidate, NearMissHits, NearMissRecord, OpportunityRecord, NEAR_MISS_NOTE};
pub use sink::{ArtifactSink, CollectingSink, DirectorySink};
pub use writer::SiteArtifacts;
