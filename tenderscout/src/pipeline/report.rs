//! Per-site and per-batch results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How one site pipeline ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SiteOutcome {
    /// Artifacts written, possibly empty.
    Completed,
    /// Listing pages fetched, but no detail links; empty artifacts written.
    LayoutMismatch,
    /// No listing candidate could be fetched; empty artifacts written.
    TransportUnavailable,
    /// The pipeline failed (artifact write error or panic).
    Failed(String),
}

impl SiteOutcome {
    /// Stable string form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::LayoutMismatch => "layout_mismatch",
            Self::TransportUnavailable => "transport_unavailable",
            Self::Failed(_) => "failed",
        }
    }
}

/// Counts and outcome of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    /// Site identifier.
    pub site: String,
    /// Outcome.
    pub outcome: SiteOutcome,
    /// Records in the raw artifact.
    pub raw_count: usize,
    /// Records in the filtered artifact.
    pub filtered_count: usize,
    /// Near-miss records found.
    pub near_count: usize,
    /// Whether the filtered artifact came from the top-N fallback.
    pub fallback_used: bool,
}

impl SiteReport {
    /// A report with zero counts.
    #[must_use]
    pub fn new(site: impl Into<String>, outcome: SiteOutcome) -> Self {
        Self {
            site: site.into(),
            outcome,
            raw_count: 0,
            filtered_count: 0,
            near_count: 0,
            fallback_used: false,
        }
    }

    /// A failed report.
    #[must_use]
    pub fn failed(site: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(site, SiteOutcome::Failed(reason.into()))
    }
}

/// Result of a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the last site finished.
    pub finished_at: DateTime<Utc>,
    /// One report per site, in profile order.
    pub sites: Vec<SiteReport>,
}

impl BatchSummary {
    /// Whether the run counts as failed: a site failed, or every site found
    /// the transport unusable.
    ///
    /// Finding nothing is not a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        let any_failed = self
            .sites
            .iter()
            .any(|s| matches!(s.outcome, SiteOutcome::Failed(_)));
        let all_unavailable = !self.sites.is_empty()
            && self
                .sites
                .iter()
                .all(|s| s.outcome == SiteOutcome::TransportUnavailable);
        any_failed || all_unavailable
    }

    /// Process exit status: 0 on success, 1 on failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(self.is_failure())
    }

    /// Wall-clock duration of the batch in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
