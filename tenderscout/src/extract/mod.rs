//! Link and text extraction from listing and detail markup.
//!
//! This module provides:
//! - Candidate-link models tagged with their discovery method
//! - The [`LinkExtractor`] capability and its three strategies
//! - Detail-page title/body parsing and label fallback

mod models;
mod strategies;
mod text;

pub use models::{CandidateLink, DetailText, DiscoveryMethod};
pub use strategies::{
    resolve_url, AnchorStrategy, DataAttributeStrategy, ExtractorSet, LinkExtractor,
    ScriptNavigationStrategy, LOCATION_ASSIGNMENT,
};
pub use text::{label_for, normalize_ws, parse_detail, visible_text};
