//! Sequential walk over listing pages 1..=N.

use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::locator::{scan_page, ListingPage, LocatedListing};
use super::paginator::page_url;
use crate::events::{
    EventSink, LISTING_DUPLICATE_PAGE, LISTING_EXHAUSTED, LISTING_PAGE, LISTING_PAGE_FAILED,
};
use crate::extract::{CandidateLink, ExtractorSet};
use crate::fetch::Fetcher;
use crate::profile::SiteProfile;

/// Why the walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStop {
    /// All configured pages were read.
    Completed,
    /// This page repeated the previous page's detail links.
    DuplicatePage {
        /// The repeating page.
        page: u32,
    },
    /// This page was fetched successfully but had no detail links.
    Exhausted {
        /// The empty page.
        page: u32,
    },
}

/// Pages read and why reading stopped.
#[derive(Debug, Clone)]
pub struct ListingWalk {
    /// Pages that contributed links, in page order.
    pub pages: Vec<ListingPage>,
    /// Page numbers whose fetch failed and were skipped.
    pub failed_pages: Vec<u32>,
    /// Stop reason.
    pub stop: WalkStop,
}

impl ListingWalk {
    /// Detail links of every page, in crawl order.
    pub fn detail_links(&self) -> impl Iterator<Item = &CandidateLink> {
        self.pages.iter().flat_map(|p| p.detail_links.iter())
    }
}

/// Reads listing pages of a located endpoint one after another.
pub struct ListingWalker<'a> {
    profile: &'a SiteProfile,
    fetcher: &'a dyn Fetcher,
    extractors: &'a ExtractorSet,
    events: &'a dyn EventSink,
    timeout: Duration,
    pages: u32,
}

impl<'a> ListingWalker<'a> {
    /// Creates a walker reading up to `pages` pages.
    #[must_use]
    pub fn new(
        profile: &'a SiteProfile,
        fetcher: &'a dyn Fetcher,
        extractors: &'a ExtractorSet,
        events: &'a dyn EventSink,
        timeout: Duration,
        pages: u32,
    ) -> Self {
        Self {
            profile,
            fetcher,
            extractors,
            events,
            timeout,
            pages,
        }
    }

    /// Walks pages 1..=N, reusing the locator's page 1.
    ///
    /// Stops early when a page's fingerprint equals the previous page's, or
    /// when a page after the first is served but has no detail links. A page
    /// whose fetch fails is skipped and the walk goes on.
    pub async fn walk(&self, located: LocatedListing) -> ListingWalk {
        let site = self.profile.id.as_str();
        let LocatedListing {
            endpoint,
            first_page,
        } = located;

        self.page_read(&first_page);
        let mut previous = first_page.fingerprint();
        let mut pages = vec![first_page];
        let mut failed_pages = Vec::new();

        for n in 2..=self.pages.max(1) {
            let url = page_url(&endpoint, n);
            let scanned = scan_page(
                self.fetcher,
                self.extractors,
                self.profile,
                &url,
                n,
                self.timeout,
            )
            .await;
            if !scanned.result.ok() {
                warn!(
                    site,
                    page = n,
                    url = %url,
                    status = scanned.result.status_code,
                    "Listing page fetch failed, skipping"
                );
                self.events.try_emit(
                    LISTING_PAGE_FAILED,
                    Some(json!({
                        "site": site,
                        "page": n,
                        "url": url,
                        "status": scanned.result.status_code,
                    })),
                );
                failed_pages.push(n);
                continue;
            }
            let page = scanned.page;

            if page.detail_links.is_empty() {
                info!(site, page = n, url = %url, "Listing exhausted");
                self.events.try_emit(
                    LISTING_EXHAUSTED,
                    Some(json!({"site": site, "page": n, "url": url})),
                );
                return ListingWalk {
                    pages,
                    failed_pages,
                    stop: WalkStop::Exhausted { page: n },
                };
            }

            let fingerprint = page.fingerprint();
            if fingerprint == previous {
                info!(site, page = n, url = %url, "Listing page repeats previous page");
                self.events.try_emit(
                    LISTING_DUPLICATE_PAGE,
                    Some(json!({"site": site, "page": n, "url": url})),
                );
                return ListingWalk {
                    pages,
                    failed_pages,
                    stop: WalkStop::DuplicatePage { page: n },
                };
            }

            self.page_read(&page);
            previous = fingerprint;
            pages.push(page);
        }

        debug!(
            site,
            pages = pages.len(),
            failed = failed_pages.len(),
            "Listing walk completed"
        );
        ListingWalk {
            pages,
            failed_pages,
            stop: WalkStop::Completed,
        }
    }

    fn page_read(&self, page: &ListingPage) {
        let site = self.profile.id.as_str();
        info!(
            site,
            page = page.page,
            links = page.candidate_count,
            detail_links = page.detail_links.len(),
            "Read listing page"
        );
        self.events.try_emit(
            LISTING_PAGE,
            Some(json!({
                "site": site,
                "page": page.page,
                "url": page.url,
                "links": page.candidate_count,
                "detail_links": page.detail_links.len(),
            })),
        );
    }
}

impl std::fmt::Debug for ListingWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingWalker")
            .field("site", &self.profile.id)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::pipeline::locator::ListingLocator;
    use crate::testing::{fixture_profile, listing_page, StaticFetcher};
    use pretty_assertions::assert_eq;

    const PAGE_1: &str = "https://portal.test/tenders?status=open";
    const PAGE_2: &str = "https://portal.test/tenders?status=open&page=2";
    const PAGE_3: &str = "https://portal.test/tenders?status=open&page=3";

    async fn walk(fetcher: &StaticFetcher, pages: u32, events: &CollectingEventSink) -> ListingWalk {
        let profile = fixture_profile("T");
        let extractors = ExtractorSet::standard().unwrap();
        let timeout = Duration::from_secs(1);
        let located = ListingLocator::new(&profile, fetcher, &extractors, events, timeout)
            .locate()
            .await
            .outcome
            .unwrap();
        ListingWalker::new(&profile, fetcher, &extractors, events, timeout, pages)
            .walk(located)
            .await
    }

    #[tokio::test]
    async fn test_reads_all_pages_and_reuses_page_one() {
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, listing_page(&[("/tender/view/1", "One")]))
            .with_page(PAGE_2, listing_page(&[("/tender/view/2", "Two")]))
            .with_page(PAGE_3, listing_page(&[("/tender/view/3", "Three")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 3, &events).await;

        assert_eq!(result.stop, WalkStop::Completed);
        assert_eq!(result.detail_links().count(), 3);
        assert_eq!(fetcher.call_count(PAGE_1), 1);
        assert_eq!(fetcher.calls(), vec![PAGE_1, PAGE_2, PAGE_3]);
        assert_eq!(events.events_of_type(LISTING_PAGE).len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_page_short_circuits() {
        let same = listing_page(&[("/tender/view/1", "One"), ("/tender/view/2", "Two")]);
        let reordered = listing_page(&[("/tender/view/2", "Two"), ("/tender/view/1", "One")]);
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, same)
            .with_page(PAGE_2, reordered)
            .with_page(PAGE_3, listing_page(&[("/tender/view/3", "Three")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 5, &events).await;

        assert_eq!(result.stop, WalkStop::DuplicatePage { page: 2 });
        assert_eq!(result.pages.len(), 1);
        assert_eq!(fetcher.call_count(PAGE_3), 0);
        assert!(events.contains(LISTING_DUPLICATE_PAGE));
    }

    #[tokio::test]
    async fn test_empty_page_exhausts_walk() {
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, listing_page(&[("/tender/view/1", "One")]))
            .with_page(PAGE_2, listing_page(&[]))
            .with_page(PAGE_3, listing_page(&[("/tender/view/3", "Three")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 4, &events).await;

        assert_eq!(result.stop, WalkStop::Exhausted { page: 2 });
        assert_eq!(result.pages.len(), 1);
        assert!(result.failed_pages.is_empty());
        assert_eq!(fetcher.call_count(PAGE_3), 0);
        assert!(events.contains(LISTING_EXHAUSTED));
    }

    #[tokio::test]
    async fn test_failed_page_does_not_end_walk() {
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, listing_page(&[("/tender/view/1", "One")]))
            .with_status(PAGE_2, 503)
            .with_page(PAGE_3, listing_page(&[("/tender/view/3", "Three")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 3, &events).await;

        assert_eq!(result.stop, WalkStop::Completed);
        assert_eq!(result.failed_pages, vec![2]);
        assert_eq!(result.detail_links().count(), 2);
        assert_eq!(fetcher.call_count(PAGE_3), 1);
        assert!(events.contains(LISTING_PAGE_FAILED));
        assert!(!events.contains(LISTING_EXHAUSTED));
    }

    #[tokio::test]
    async fn test_unreachable_page_is_skipped() {
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, listing_page(&[("/tender/view/1", "One")]))
            .with_page(PAGE_3, listing_page(&[("/tender/view/3", "Three")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 3, &events).await;

        assert_eq!(result.stop, WalkStop::Completed);
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[1].page, 3);
    }

    #[tokio::test]
    async fn test_single_page_fetches_nothing_more() {
        let fetcher = StaticFetcher::new()
            .with_page(PAGE_1, listing_page(&[("/tender/view/1", "One")]));
        let events = CollectingEventSink::new();

        let result = walk(&fetcher, 1, &events).await;

        assert_eq!(result.stop, WalkStop::Completed);
        assert_eq!(fetcher.calls().len(), 1);
    }
}
