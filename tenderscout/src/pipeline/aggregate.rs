//! Deduplication of candidate links into unique opportunities.

use std::collections::HashSet;

use crate::extract::CandidateLink;
use crate::opportunity::UniqueOpportunity;

/// Collects candidates in crawl order, keeping the first one seen per URL.
#[derive(Debug, Default)]
pub struct Aggregator {
    generic_labels: Vec<String>,
    seen: HashSet<String>,
    opportunities: Vec<UniqueOpportunity>,
}

impl Aggregator {
    /// Creates an aggregator labelling with the given generic link texts.
    #[must_use]
    pub fn new(generic_labels: Vec<String>) -> Self {
        Self {
            generic_labels,
            ..Self::default()
        }
    }

    /// Adds one candidate; returns whether it was new.
    pub fn push(&mut self, candidate: &CandidateLink) -> bool {
        if !self.seen.insert(candidate.url.clone()) {
            return false;
        }
        self.opportunities
            .push(UniqueOpportunity::from_candidate(candidate, &self.generic_labels));
        true
    }

    /// Adds candidates in order.
    pub fn extend<'a>(&mut self, candidates: impl IntoIterator<Item = &'a CandidateLink>) {
        for candidate in candidates {
            self.push(candidate);
        }
    }

    /// Unique opportunities so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.opportunities.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    /// Unique opportunities in first-seen order.
    #[must_use]
    pub fn into_opportunities(self) -> Vec<UniqueOpportunity> {
        self.opportunities
    }
}
