//! Bounded, parallel detail-page sampling.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::extract::{parse_detail, DetailText};
use crate::fetch::Fetcher;
use crate::opportunity::UniqueOpportunity;

/// Fetches detail pages for a prefix of the unique opportunities.
///
/// Up to `workers` fetches run at once. Results travel over a channel to a
/// single consumer that owns the result map, so nothing is shared mutably.
#[derive(Clone)]
pub struct DetailSampler {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
    deadline: Duration,
    workers: usize,
    limit: usize,
}

impl DetailSampler {
    /// Creates a sampler.
    ///
    /// `timeout` is passed to every request; `deadline` bounds each item
    /// as a whole, including any wait inside the fetcher.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        timeout: Duration,
        deadline: Duration,
        workers: usize,
        limit: usize,
    ) -> Self {
        Self {
            fetcher,
            timeout,
            deadline,
            workers: workers.max(1),
            limit,
        }
    }

    /// Attaches detail text to the first `limit` opportunities.
    ///
    /// Sampled opportunities always get a detail (possibly empty); the rest
    /// keep `None` and are scored on their listing label alone.
    pub async fn sample(&self, opportunities: Vec<UniqueOpportunity>) -> Vec<UniqueOpportunity> {
        let limit = self.limit.min(opportunities.len());
        if limit == 0 {
            return opportunities;
        }

        let targets: Vec<(usize, String)> = opportunities
            .iter()
            .take(limit)
            .map(|o| o.url.clone())
            .enumerate()
            .collect();

        let (tx, mut rx) = mpsc::channel::<(usize, DetailText)>(self.workers);
        let fetcher = Arc::clone(&self.fetcher);
        let (timeout, deadline, workers) = (self.timeout, self.deadline, self.workers);

        let producer = tokio::spawn(async move {
            let mut fetches = stream::iter(targets)
                .map(|(index, url)| {
                    let fetcher = Arc::clone(&fetcher);
                    async move {
                        let detail = fetch_detail(fetcher.as_ref(), &url, timeout, deadline).await;
                        (index, detail)
                    }
                })
                .buffer_unordered(workers);

            while let Some(item) = fetches.next().await {
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        let mut details: HashMap<usize, DetailText> = HashMap::with_capacity(limit);
        while let Some((index, detail)) = rx.recv().await {
            details.insert(index, detail);
        }
        if let Err(err) = producer.await {
            warn!(error = %err, "Detail sampling task ended abnormally");
        }

        opportunities
            .into_iter()
            .enumerate()
            .map(|(index, opportunity)| {
                if index < limit {
                    let detail = details.remove(&index).unwrap_or_default();
                    opportunity.with_detail(detail)
                } else {
                    opportunity
                }
            })
            .collect()
    }
}

async fn fetch_detail(
    fetcher: &dyn Fetcher,
    url: &str,
    timeout: Duration,
    deadline: Duration,
) -> DetailText {
    match tokio::time::timeout(deadline, fetcher.fetch(url, timeout)).await {
        Ok(result) => {
            let detail = parse_detail(result.body());
            debug!(url, ok = result.ok(), title = %detail.title, "Sampled detail page");
            detail
        }
        Err(_) => {
            warn!(url, deadline_ms = deadline.as_millis() as u64, "Detail fetch timed out");
            DetailText::default()
        }
    }
}

impl std::fmt::Debug for DetailSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailSampler")
            .field("timeout", &self.timeout)
            .field("deadline", &self.deadline)
            .field("workers", &self.workers)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{CandidateLink, DiscoveryMethod};
    use crate::testing::{detail_page, StaticFetcher};
    use pretty_assertions::assert_eq;

    fn opportunities(n: usize) -> Vec<UniqueOpportunity> {
        (0..n)
            .map(|i| {
                let link = CandidateLink::new(
                    format!("https://portal.test/tender/view/{i}"),
                    format!("Label {i}"),
                    DiscoveryMethod::Anchor,
                );
                UniqueOpportunity::from_candidate(&link, &[])
            })
            .collect()
    }

    fn fetcher_for(n: usize) -> StaticFetcher {
        (0..n).fold(StaticFetcher::new(), |f, i| {
            f.with_page(
                format!("https://portal.test/tender/view/{i}"),
                detail_page(&format!("Title {i}"), &format!("Body {i}")),
            )
        })
    }

    fn sampler(fetcher: Arc<dyn Fetcher>, limit: usize) -> DetailSampler {
        DetailSampler::new(
            fetcher,
            Duration::from_secs(1),
            Duration::from_millis(200),
            3,
            limit,
        )
    }

    #[tokio::test]
    async fn test_samples_prefix_in_order() {
        let fetcher = Arc::new(fetcher_for(6));
        let sampled = sampler(fetcher.clone(), 4).sample(opportunities(6)).await;

        let titles: Vec<_> = sampled.iter().map(UniqueOpportunity::title).collect();
        assert_eq!(
            titles,
            vec!["Title 0", "Title 1", "Title 2", "Title 3", "Label 4", "Label 5"]
        );
        assert!(sampled[4].detail.is_none());
        assert_eq!(sampled[2].body(), "Body 2");
        assert_eq!(fetcher.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_zero_limit_fetches_nothing() {
        let fetcher = Arc::new(fetcher_for(2));
        let sampled = sampler(fetcher.clone(), 0).sample(opportunities(2)).await;

        assert!(sampled.iter().all(|o| o.detail.is_none()));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stuck_fetch_becomes_empty_detail() {
        let fetcher = Arc::new(
            fetcher_for(3).with_delay("https://portal.test/tender/view/1", Duration::from_secs(30)),
        );
        let sampled = sampler(fetcher, 3).sample(opportunities(3)).await;

        assert_eq!(sampled[0].title(), "Title 0");
        assert_eq!(sampled[1].detail, Some(DetailText::default()));
        assert_eq!(sampled[1].title(), "Label 1");
        assert_eq!(sampled[2].title(), "Title 2");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_label() {
        let fetcher = Arc::new(StaticFetcher::new());
        let sampled = sampler(fetcher, 5).sample(opportunities(1)).await;
        assert_eq!(sampled[0].title(), "Label 0");
        assert_eq!(sampled[0].body(), "");
    }
}
