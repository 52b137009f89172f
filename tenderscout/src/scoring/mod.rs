//! Relevance scoring, classification and inclusion.
//!
//! This module provides:
//! - [`RelevanceScorer`]: weighted hit counts over title and body
//! - [`classify`]: `Strict` / `NearMiss` / `Excluded` from hit counts
//! - [`InclusionPolicy`]: strict or lenient inclusion plus the top-N fallback

mod classify;
mod policy;
mod scorer;

pub use classify::{classify, Classification};
pub use policy::{near_misses, rank, FilterOutcome, InclusionPolicy};
pub use scorer::{
    Assessment, HitBreakdown, RelevanceScorer, BOOSTER_BODY_WEIGHT, BOOSTER_TITLE_WEIGHT,
    PRIMARY_BODY_WEIGHT, PRIMARY_TITLE_WEIGHT,
};
