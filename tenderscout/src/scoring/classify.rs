//! Per-opportunity classification.

use serde::{Deserialize, Serialize};

use super::scorer::HitBreakdown;

/// Terminal classification of a scored opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// At least one primary hit.
    Strict,
    /// No primary hit, but booster and generic-work hits and no disqualifier.
    NearMiss,
    /// Everything else.
    Excluded,
}

impl Classification {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::NearMiss => "near_miss",
            Self::Excluded => "excluded",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies from hit counts alone.
///
/// A primary hit always wins, whatever the disqualifiers say.
#[must_use]
pub fn classify(hits: &HitBreakdown, generic: u32, disqualified: bool) -> Classification {
    if hits.primary_total() > 0 {
        Classification::Strict
    } else if hits.booster_total() > 0 && generic > 0 && !disqualified {
        Classification::NearMiss
    } else {
        Classification::Excluded
    }
}
