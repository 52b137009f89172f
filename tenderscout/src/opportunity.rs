//! Opportunity models shared by aggregation, scoring and output.

use serde::{Deserialize, Serialize};

use crate::extract::{label_for, CandidateLink, DetailText, DiscoveryMethod};
use crate::scoring::Assessment;

/// One opportunity, identified by its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueOpportunity {
    /// Canonical URL; the dedup key.
    pub url: String,
    /// Best label available from the listing page.
    pub label: String,
    /// Visible text of the first candidate that surfaced this URL.
    pub discovery_text: String,
    /// How the first candidate was found.
    pub method: DiscoveryMethod,
    /// Sampled detail text, when this opportunity was in the sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailText>,
}

impl UniqueOpportunity {
    /// Builds an opportunity from its first-seen candidate.
    #[must_use]
    pub fn from_candidate(candidate: &CandidateLink, generic_labels: &[String]) -> Self {
        Self {
            url: candidate.url.clone(),
            label: label_for(&candidate.url, &candidate.text, generic_labels),
            discovery_text: candidate.text.clone(),
            method: candidate.method,
            detail: None,
        }
    }

    /// Attaches sampled detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: DetailText) -> Self {
        self.detail = Some(detail);
        self
    }

    /// The detail title when one was sampled and non-empty, else the label.
    #[must_use]
    pub fn title(&self) -> &str {
        match &self.detail {
            Some(detail) if !detail.title.is_empty() => &detail.title,
            _ => &self.label,
        }
    }

    /// The detail body, or nothing for unsampled opportunities.
    #[must_use]
    pub fn body(&self) -> &str {
        self.detail.as_ref().map_or("", |d| d.body.as_str())
    }
}

/// An opportunity after scoring, classification and inclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredOpportunity {
    /// The underlying opportunity.
    pub opportunity: UniqueOpportunity,
    /// Score, hits and classification.
    pub assessment: Assessment,
    /// Whether the active inclusion policy keeps this record.
    pub include: bool,
}

impl ScoredOpportunity {
    /// Title used for ranking and output.
    #[must_use]
    pub fn title(&self) -> &str {
        self.opportunity.title()
    }

    /// Canonical URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.opportunity.url
    }

    /// The score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.assessment.score
    }
}
