//! Fetching listing and detail markup.
//!
//! This module provides:
//! - The [`Fetcher`] protocol and its never-failing [`FetchResult`]
//! - An HTTP implementation with an explicit trust-downgrade policy
//! - Per-host concurrency limits with randomized politeness delays

mod http;
mod protocols;
mod throttle;

pub use http::{HttpFetcher, TrustPolicy};
pub use protocols::{FetchResult, Fetcher, TrustLevel};
pub use throttle::{HostLimiter, ThrottledFetcher};

#[cfg(test)]
pub use protocols::MockFetcher;
