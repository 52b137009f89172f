//! Network-free test doubles and fixtures.
//!
//! This module provides:
//! - [`StaticFetcher`]: canned bodies by URL, with call recording
//! - Markup builders for listing and detail pages
//! - A fixture profile and a delay-free run configuration

mod fetcher;
mod fixtures;

pub use fetcher::StaticFetcher;
pub use fixtures::{detail_page, fast_config, fixture_profile, listing_page, FIXTURE_HOST};
