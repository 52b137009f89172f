//! Positional, category-weighted relevance scoring.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::classify::{classify, Classification};
use crate::taxonomy::TermTaxonomy;

/// Score units per primary hit in the title.
pub const PRIMARY_TITLE_WEIGHT: u32 = 3;
/// Score units per primary hit in the body.
pub const PRIMARY_BODY_WEIGHT: u32 = 2;
/// Score units per booster hit in the title.
pub const BOOSTER_TITLE_WEIGHT: u32 = 2;
/// Score units per booster hit in the body.
pub const BOOSTER_BODY_WEIGHT: u32 = 1;

/// Hit counts per category and location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitBreakdown {
    /// Primary hits in the title.
    pub primary_title: u32,
    /// Primary hits in the body.
    pub primary_body: u32,
    /// Booster hits in the title.
    pub booster_title: u32,
    /// Booster hits in the body.
    pub booster_body: u32,
}

impl HitBreakdown {
    /// Total primary hits.
    #[must_use]
    pub fn primary_total(&self) -> u32 {
        self.primary_title.saturating_add(self.primary_body)
    }

    /// Total booster hits.
    #[must_use]
    pub fn booster_total(&self) -> u32 {
        self.booster_title.saturating_add(self.booster_body)
    }

    /// `3·primary_title + 2·primary_body + 2·booster_title + 1·booster_body`.
    #[must_use]
    pub fn score(&self) -> u32 {
        [
            (self.primary_title, PRIMARY_TITLE_WEIGHT),
            (self.primary_body, PRIMARY_BODY_WEIGHT),
            (self.booster_title, BOOSTER_TITLE_WEIGHT),
            (self.booster_body, BOOSTER_BODY_WEIGHT),
        ]
        .iter()
        .fold(0u32, |acc, (hits, weight)| {
            acc.saturating_add(hits.saturating_mul(*weight))
        })
    }
}

/// Everything the scorer learns about one opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Weighted score.
    pub score: u32,
    /// Primary/booster breakdown.
    pub hits: HitBreakdown,
    /// Generic-work hits over title and body.
    pub generic: u32,
    /// Whether a disqualifier occurs in title or body.
    pub disqualified: bool,
    /// Resulting classification.
    pub classification: Classification,
}

/// Scores free text against a shared taxonomy.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    taxonomy: Arc<TermTaxonomy>,
}

impl RelevanceScorer {
    /// Creates a scorer over a compiled taxonomy.
    #[must_use]
    pub fn new(taxonomy: Arc<TermTaxonomy>) -> Self {
        Self { taxonomy }
    }

    /// The taxonomy in use.
    #[must_use]
    pub fn taxonomy(&self) -> &TermTaxonomy {
        &self.taxonomy
    }

    /// Score and hit breakdown of a title/body pair.
    #[must_use]
    pub fn score(&self, title: &str, body: &str) -> (u32, HitBreakdown) {
        let hits = HitBreakdown {
            primary_title: self.taxonomy.primary().count(title),
            primary_body: self.taxonomy.primary().count(body),
            booster_title: self.taxonomy.booster().count(title),
            booster_body: self.taxonomy.booster().count(body),
        };
        (hits.score(), hits)
    }

    /// Scores and classifies a title/body pair.
    #[must_use]
    pub fn assess(&self, title: &str, body: &str) -> Assessment {
        let (score, hits) = self.score(title, body);
        let combined = format!("{title} {body}");
        let generic = self.taxonomy.generic_work().count(&combined);
        let disqualified = self.taxonomy.disqualifier().is_present(&combined);

        Assessment {
            score,
            hits,
            generic,
            disqualified,
            classification: classify(&hits, generic, disqualified),
        }
    }
}
