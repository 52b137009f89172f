//! Inclusion policy, ranking and the top-N fallback.

use super::classify::Classification;
use super::scorer::Assessment;
use crate::config::RunConfig;
use crate::opportunity::ScoredOpportunity;

/// Which scored opportunities reach the filtered artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InclusionPolicy {
    /// Require a primary hit (`Strict`) instead of any positive score.
    pub strict_required: bool,
    /// Emit only included records; otherwise the filtered set is the raw set.
    pub only_filtered: bool,
    /// Records kept when nothing is included.
    pub fallback_top_n: usize,
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        Self {
            strict_required: true,
            only_filtered: true,
            fallback_top_n: 20,
        }
    }
}

/// How the filtered set was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Filtering is off; every record.
    Unfiltered(Vec<ScoredOpportunity>),
    /// Records passing the inclusion rule.
    Included(Vec<ScoredOpportunity>),
    /// Nothing passed; the best-ranked records instead.
    Fallback(Vec<ScoredOpportunity>),
}

impl FilterOutcome {
    /// The selected records.
    #[must_use]
    pub fn records(&self) -> &[ScoredOpportunity] {
        match self {
            Self::Unfiltered(r) | Self::Included(r) | Self::Fallback(r) => r,
        }
    }

    /// Consumes the outcome.
    #[must_use]
    pub fn into_records(self) -> Vec<ScoredOpportunity> {
        match self {
            Self::Unfiltered(r) | Self::Included(r) | Self::Fallback(r) => r,
        }
    }

    /// Whether the fallback produced these records.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl InclusionPolicy {
    /// Takes the inclusion knobs from a run configuration.
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            strict_required: config.strict_required,
            only_filtered: config.only_filtered,
            fallback_top_n: config.fallback_top_n,
        }
    }

    /// Whether one assessment is included.
    #[must_use]
    pub fn includes(&self, assessment: &Assessment) -> bool {
        if self.strict_required {
            assessment.classification == Classification::Strict
        } else {
            assessment.score > 0
        }
    }

    /// Selects the filtered set from records already in rank order.
    #[must_use]
    pub fn select(&self, ranked: &[ScoredOpportunity]) -> FilterOutcome {
        if !self.only_filtered {
            return FilterOutcome::Unfiltered(ranked.to_vec());
        }

        let included: Vec<_> = ranked.iter().filter(|r| r.include).cloned().collect();
        if included.is_empty() && !ranked.is_empty() {
            let top = ranked.iter().take(self.fallback_top_n).cloned().collect();
            return FilterOutcome::Fallback(top);
        }
        FilterOutcome::Included(included)
    }
}

/// Sorts by descending score, then case-insensitive title.
pub fn rank(records: &mut [ScoredOpportunity]) {
    records.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| a.title().to_lowercase().cmp(&b.title().to_lowercase()))
    });
}

/// Near-miss records, in the order given.
#[must_use]
pub fn near_misses(ranked: &[ScoredOpportunity]) -> Vec<ScoredOpportunity> {
    ranked
        .iter()
        .filter(|r| r.assessment.classification == Classification::NearMiss)
        .cloned()
        .collect()
}
