//! Serialized record shapes.

use serde::{Deserialize, Serialize};

use crate::extract::{CandidateLink, DiscoveryMethod};
use crate::opportunity::ScoredOpportunity;
use crate::scoring::{Classification, HitBreakdown};

/// Note attached to every near-miss record.
pub const NEAR_MISS_NOTE: &str = "Near-miss: booster + generic-work terms, no primary keyword";

/// Raw and filtered artifact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Detail title or label.
    pub title: String,
    /// Canonical URL.
    pub source_url: String,
    /// Site identifier.
    pub site: String,
    /// Weighted score.
    pub score: u32,
    /// Hit breakdown.
    pub hits: HitBreakdown,
    /// Inclusion flag.
    pub include: bool,
    /// Classification.
    pub classification: Classification,
}

impl OpportunityRecord {
    /// Builds the record for `site`.
    #[must_use]
    pub fn new(scored: &ScoredOpportunity, site: &str) -> Self {
        Self {
            title: scored.title().to_string(),
            source_url: scored.url().to_string(),
            site: site.to_string(),
            score: scored.score(),
            hits: scored.assessment.hits,
            include: scored.include,
            classification: scored.assessment.classification,
        }
    }
}

/// Hit breakdown plus the generic-work count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMissHits {
    /// Primary/booster counts.
    #[serde(flatten)]
    pub hits: HitBreakdown,
    /// Generic-work hits.
    pub generic: u32,
}

/// Near-miss artifact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMissRecord {
    /// Detail title or label.
    pub title: String,
    /// Canonical URL.
    pub source_url: String,
    /// Site identifier.
    pub site: String,
    /// Weighted score.
    pub score: u32,
    /// Hits including generic work.
    pub hits: NearMissHits,
    /// Triage note.
    pub note: String,
}

impl NearMissRecord {
    /// Builds the record for `site`.
    #[must_use]
    pub fn new(scored: &ScoredOpportunity, site: &str) -> Self {
        Self {
            title: scored.title().to_string(),
            source_url: scored.url().to_string(),
            site: site.to_string(),
            score: scored.score(),
            hits: NearMissHits {
                hits: scored.assessment.hits,
                generic: scored.assessment.generic,
            },
            note: NEAR_MISS_NOTE.to_string(),
        }
    }
}

/// One entry of the candidate-link dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugCandidate {
    /// Absolute URL.
    pub href: String,
    /// Visible text.
    pub text: String,
    /// Discovery method.
    pub method: DiscoveryMethod,
    /// Whether the site's rule classified it as a detail link.
    pub detail: bool,
}

impl DebugCandidate {
    /// Builds an entry.
    #[must_use]
    pub fn new(candidate: &CandidateLink, detail: bool) -> Self {
        Self {
            href: candidate.url.clone(),
            text: candidate.text.clone(),
            method: candidate.method,
            detail,
        }
    }
}
