//! Per-host concurrency limits and politeness delays.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::protocols::{FetchResult, Fetcher};
use crate::config::DelayConfig;

/// Pool of semaphores, one per host.
///
/// Shared by every fetcher that talks to the same hosts so that parallel
/// sites and parallel detail workers respect one limit per host.
#[derive(Debug)]
pub struct HostLimiter {
    permits_per_host: usize,
    hosts: DashMap<String, Arc<Semaphore>>,
}

impl HostLimiter {
    /// Creates a limiter allowing `permits_per_host` in-flight requests per host.
    #[must_use]
    pub fn new(permits_per_host: usize) -> Self {
        Self {
            permits_per_host: permits_per_host.max(1),
            hosts: DashMap::new(),
        }
    }

    /// Waits for a slot on the host of `url`.
    pub async fn acquire(&self, url: &str) -> OwnedSemaphorePermit {
        let semaphore = self
            .hosts
            .entry(host_key(url))
            .or_insert_with(|| Arc::new(Semaphore::new(self.permits_per_host)))
            .clone();

        loop {
            // The semaphore is never closed, so acquisition only fails if
            // that invariant is broken; retry instead of panicking.
            if let Ok(permit) = semaphore.clone().acquire_owned().await {
                return permit;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Free slots for the host of `url`.
    #[must_use]
    pub fn available(&self, url: &str) -> usize {
        self.hosts
            .get(&host_key(url))
            .map_or(self.permits_per_host, |s| s.available_permits())
    }

    /// Number of distinct hosts seen so far.
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}

fn host_key(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Wraps a fetcher with a host permit, a request deadline and a randomized
/// courtesy delay.
///
/// The permit is held for the request and the delay that follows it, so
/// with one permit per host, consecutive requests to a host are spaced by
/// at least the delay. A request still running at `timeout` is abandoned
/// and reported as a failed fetch.
#[derive(Clone)]
pub struct ThrottledFetcher {
    inner: Arc<dyn Fetcher>,
    limiter: Arc<HostLimiter>,
    delay: DelayConfig,
}

impl ThrottledFetcher {
    /// Creates a throttled fetcher.
    #[must_use]
    pub fn new(inner: Arc<dyn Fetcher>, limiter: Arc<HostLimiter>, delay: DelayConfig) -> Self {
        Self {
            inner,
            limiter,
            delay,
        }
    }
}

impl std::fmt::Debug for ThrottledFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottledFetcher")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetcher for ThrottledFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let _permit = self.limiter.acquire(url).await;
        let start = Instant::now();
        let result = match tokio::time::timeout(timeout, self.inner.fetch(url, timeout)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(url, timeout_ms = timeout.as_millis() as u64, "Request timed out");
                FetchResult::failed(url, 0, start.elapsed().as_secs_f64() * 1000.0)
            }
        };
        let pause = self.delay.sample();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticFetcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_limiter_tracks_hosts_separately() {
        let limiter = HostLimiter::new(1);
        let permit_a = limiter.acquire("https://a.example/x").await;
        assert_eq!(limiter.available("https://a.example/y"), 0);
        assert_eq!(limiter.available("https://b.example/"), 1);
        drop(permit_a);
        assert_eq!(limiter.available("https://a.example/y"), 1);
        assert_eq!(limiter.host_count(), 1);
    }

    #[tokio::test]
    async fn test_host_key_ignores_case_and_path() {
        let limiter = HostLimiter::new(2);
        let _p = limiter.acquire("https://Example.COM/a").await;
        assert_eq!(limiter.available("https://example.com/b?x=1"), 1);
    }

    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for ConcurrencyProbe {
        async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            FetchResult::success(url, "")
        }
    }

    #[tokio::test]
    async fn test_throttled_fetcher_caps_per_host_concurrency() {
        let probe = Arc::new(ConcurrencyProbe {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let limiter = Arc::new(HostLimiter::new(2));
        let fetcher = ThrottledFetcher::new(probe.clone(), limiter, DelayConfig::none());

        let futures = (0..6).map(|i| {
            let fetcher = fetcher.clone();
            async move {
                fetcher
                    .fetch(&format!("https://host.example/{i}"), Duration::from_secs(1))
                    .await
            }
        });
        let results = futures::future::join_all(futures).await;

        assert_eq!(results.len(), 6);
        assert!(probe.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_throttled_fetcher_abandons_slow_requests() {
        let inner = Arc::new(
            StaticFetcher::new()
                .with_page("https://slow.example/", "late")
                .with_delay("https://slow.example/", Duration::from_secs(5)),
        );
        let fetcher = ThrottledFetcher::new(inner, Arc::new(HostLimiter::new(1)), DelayConfig::none());

        let result = fetcher
            .fetch("https://slow.example/", Duration::from_millis(50))
            .await;

        assert!(!result.ok());
        assert_eq!(result.body(), "");
    }

    #[tokio::test]
    async fn test_throttled_fetcher_passes_results_through() {
        let inner = Arc::new(StaticFetcher::new().with_page("https://a.example/", "<p>hi</p>"));
        let fetcher = ThrottledFetcher::new(
            inner.clone(),
            Arc::new(HostLimiter::new(1)),
            DelayConfig::none(),
        );

        let hit = fetcher.fetch("https://a.example/", Duration::from_secs(1)).await;
        let miss = fetcher.fetch("https://a.example/missing", Duration::from_secs(1)).await;

        assert_eq!(hit.body(), "<p>hi</p>");
        assert!(!miss.ok());
        assert_eq!(inner.calls().len(), 2);
    }
}
