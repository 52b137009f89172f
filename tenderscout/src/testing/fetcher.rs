//! A fetcher that serves canned pages.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::fetch::{FetchResult, Fetcher};

/// Serves registered bodies by exact URL; anything else fails with 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    statuses: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a successful page.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Registers a failing URL with the given status (0 for a transport failure).
    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(url.into(), status);
        self
    }

    /// Delays the response for `url`.
    #[must_use]
    pub fn with_delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// How many times `url` was requested.
    #[must_use]
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == url).count()
    }

    /// Forgets recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult {
        self.calls.lock().push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(status) = self.statuses.get(url) {
            return FetchResult::failed(url, *status, 0.0);
        }
        match self.pages.get(url) {
            Some(body) => FetchResult::success(url, body.clone()),
            None => FetchResult::failed(url, 404, 0.0),
        }
    }
}
