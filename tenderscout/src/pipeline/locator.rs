//! Listing endpoint discovery.

use serde_json::json;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{Result, ScoutError};
use crate::events::{EventSink, SITE_LOCATED, SITE_PROBE};
use crate::extract::{CandidateLink, ExtractorSet};
use crate::fetch::{FetchResult, Fetcher};
use crate::profile::{ListingEndpoint, SiteProfile};

/// Detail links found on one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// 1-based page number.
    pub page: u32,
    /// URL that was fetched.
    pub url: String,
    /// Number of candidates of any kind on the page.
    pub candidate_count: usize,
    /// Candidates the site's rule accepted, in extraction order.
    pub detail_links: Vec<CandidateLink>,
}

impl ListingPage {
    /// SHA-256 over the sorted, deduplicated detail-link URLs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut urls: Vec<&str> = self.detail_links.iter().map(|l| l.url.as_str()).collect();
        urls.sort_unstable();
        urls.dedup();

        let mut hasher = Sha256::new();
        for url in urls {
            hasher.update(url.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// A fetched and classified listing page, before it is known to be useful.
#[derive(Debug)]
pub(crate) struct ScannedPage {
    pub result: FetchResult,
    pub candidates: Vec<CandidateLink>,
    pub page: ListingPage,
}

/// Fetches `url` and splits its candidates into detail links.
pub(crate) async fn scan_page(
    fetcher: &dyn Fetcher,
    extractors: &ExtractorSet,
    profile: &SiteProfile,
    url: &str,
    page: u32,
    timeout: Duration,
) -> ScannedPage {
    let result = fetcher.fetch(url, timeout).await;
    let candidates = extractors.extract(result.body(), &result.final_url);
    let detail_links: Vec<_> = candidates
        .iter()
        .filter(|c| profile.is_detail_link(&c.url))
        .cloned()
        .collect();

    ScannedPage {
        page: ListingPage {
            page,
            url: url.to_string(),
            candidate_count: candidates.len(),
            detail_links,
        },
        candidates,
        result,
    }
}

/// The endpoint chosen by the locator and its first page.
#[derive(Debug, Clone)]
pub struct LocatedListing {
    /// Chosen endpoint.
    pub endpoint: ListingEndpoint,
    /// Page 1, already fetched while probing.
    pub first_page: ListingPage,
}

/// Material for the diagnostic artifacts.
#[derive(Debug, Clone, Default)]
pub struct ProbeCapture {
    /// Markup of the first listing candidate that fetched successfully.
    pub listing_html: Option<String>,
    /// Candidates of the chosen page, or of the first probe that had any.
    pub candidates: Vec<CandidateLink>,
}

/// What probing produced.
#[derive(Debug)]
pub struct LocateReport {
    /// The chosen listing, or `LayoutMismatch` / `TransportUnavailable`.
    pub outcome: Result<LocatedListing>,
    /// Diagnostic material, captured whatever the outcome.
    pub capture: ProbeCapture,
    /// Number of candidates fetched.
    pub probes: usize,
}

/// Probes a site's candidate endpoints in order until one yields detail links.
pub struct ListingLocator<'a> {
    profile: &'a SiteProfile,
    fetcher: &'a dyn Fetcher,
    extractors: &'a ExtractorSet,
    events: &'a dyn EventSink,
    timeout: Duration,
}

impl<'a> ListingLocator<'a> {
    /// Creates a locator.
    #[must_use]
    pub fn new(
        profile: &'a SiteProfile,
        fetcher: &'a dyn Fetcher,
        extractors: &'a ExtractorSet,
        events: &'a dyn EventSink,
        timeout: Duration,
    ) -> Self {
        Self {
            profile,
            fetcher,
            extractors,
            events,
            timeout,
        }
    }

    /// Probes hosts (outer) by paths (inner), stopping at the first
    /// candidate with a non-empty detail-link set.
    ///
    /// Fails with `TransportUnavailable` when no candidate could be fetched
    /// and with `LayoutMismatch` when some could but none had detail links.
    pub async fn locate(&self) -> LocateReport {
        let mut capture = ProbeCapture::default();
        let endpoints = match self.profile.endpoints() {
            Ok(endpoints) => endpoints,
            Err(err) => {
                return LocateReport {
                    outcome: Err(err),
                    capture,
                    probes: 0,
                }
            }
        };

        let site = self.profile.id.as_str();
        let mut any_fetched = false;
        let mut probes = 0;

        for endpoint in endpoints {
            probes += 1;
            let scanned = scan_page(
                self.fetcher,
                self.extractors,
                self.profile,
                endpoint.as_str(),
                1,
                self.timeout,
            )
            .await;

            if scanned.result.ok() {
                any_fetched = true;
                if capture.listing_html.is_none() {
                    capture.listing_html = Some(scanned.result.text.clone());
                }
            }
            if capture.candidates.is_empty() {
                capture.candidates.clone_from(&scanned.candidates);
            }

            let detail_count = scanned.page.detail_links.len();
            info!(
                site,
                url = endpoint.as_str(),
                status = scanned.result.status_code,
                links = scanned.page.candidate_count,
                detail_links = detail_count,
                "Probed listing candidate"
            );
            self.events.try_emit(
                SITE_PROBE,
                Some(json!({
                    "site": site,
                    "url": endpoint.as_str(),
                    "ok": scanned.result.ok(),
                    "links": scanned.page.candidate_count,
                    "detail_links": detail_count,
                })),
            );

            if detail_count > 0 {
                capture.candidates = scanned.candidates;
                info!(site, url = endpoint.as_str(), detail_links = detail_count, "Located listing");
                self.events.try_emit(
                    SITE_LOCATED,
                    Some(json!({
                        "site": site,
                        "url": endpoint.as_str(),
                        "detail_links": detail_count,
                    })),
                );
                return LocateReport {
                    outcome: Ok(LocatedListing {
                        endpoint,
                        first_page: scanned.page,
                    }),
                    capture,
                    probes,
                };
            }
            debug!(site, url = endpoint.as_str(), "No detail links, trying next candidate");
        }

        let err = if any_fetched {
            ScoutError::LayoutMismatch {
                site: site.to_string(),
            }
        } else {
            ScoutError::TransportUnavailable {
                site: site.to_string(),
            }
        };
        LocateReport {
            outcome: Err(err),
            capture,
            probes,
        }
    }
}

impl std::fmt::Debug for ListingLocator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingLocator")
            .field("site", &self.profile.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingEventSink, SITE_PROBE};
    use crate::extract::DiscoveryMethod;
    use crate::fetch::MockFetcher;
    use crate::testing::{fixture_profile, listing_page, StaticFetcher};
    use pretty_assertions::assert_eq;

    const OPEN: &str = "https://portal.test/tenders?status=open";
    const ROOT: &str = "https://portal.test/";

    async fn locate(fetcher: &dyn Fetcher, events: &CollectingEventSink) -> LocateReport {
        let profile = fixture_profile("T");
        let extractors = ExtractorSet::standard().unwrap();
        ListingLocator::new(&profile, fetcher, &extractors, events, Duration::from_secs(1))
            .locate()
            .await
    }

    #[test]
    fn test_fingerprint_ignores_order_and_duplicates() {
        let link = |u: &str| CandidateLink::new(u, "", DiscoveryMethod::Anchor);
        let a = ListingPage {
            page: 1,
            url: OPEN.to_string(),
            candidate_count: 3,
            detail_links: vec![link("https://x/1"), link("https://x/2"), link("https://x/1")],
        };
        let b = ListingPage {
            page: 2,
            url: ROOT.to_string(),
            candidate_count: 2,
            detail_links: vec![link("https://x/2"), link("https://x/1")],
        };
        let c = ListingPage {
            detail_links: vec![link("https://x/3")],
            ..b.clone()
        };

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[tokio::test]
    async fn test_first_candidate_with_detail_links_wins() {
        let fetcher = StaticFetcher::new()
            .with_page(OPEN, listing_page(&[("/tender/view/1", "Drone survey")]))
            .with_page(ROOT, listing_page(&[("/tender/view/2", "Other")]));
        let events = CollectingEventSink::new();

        let report = locate(&fetcher, &events).await;
        let located = report.outcome.unwrap();

        assert_eq!(located.endpoint.as_str(), OPEN);
        assert_eq!(located.first_page.detail_links.len(), 1);
        assert_eq!(report.probes, 1);
        assert_eq!(fetcher.calls(), vec![OPEN.to_string()]);
        assert!(events.contains(SITE_LOCATED));
    }

    #[tokio::test]
    async fn test_falls_through_to_later_candidate() {
        let fetcher = StaticFetcher::new()
            .with_page(OPEN, listing_page(&[]))
            .with_page(ROOT, listing_page(&[("/tender/view/9", "Wind farm")]));
        let events = CollectingEventSink::new();

        let report = locate(&fetcher, &events).await;

        assert_eq!(report.outcome.unwrap().endpoint.as_str(), ROOT);
        assert_eq!(report.probes, 2);
        assert_eq!(events.events_of_type(SITE_PROBE).len(), 2);
        // The first fetched page is kept for diagnostics.
        assert!(report.capture.listing_html.unwrap().contains("Open tenders"));
        assert!(report
            .capture
            .candidates
            .iter()
            .any(|c| c.url == "https://portal.test/tender/view/9"));
    }

    #[tokio::test]
    async fn test_layout_mismatch_when_pages_have_no_detail_links() {
        let fetcher = StaticFetcher::new()
            .with_page(OPEN, listing_page(&[("/news/1", "News")]))
            .with_page(ROOT, listing_page(&[]));
        let events = CollectingEventSink::new();

        let report = locate(&fetcher, &events).await;

        assert!(matches!(report.outcome, Err(ScoutError::LayoutMismatch { .. })));
        assert_eq!(report.capture.candidates.len(), 2);
        assert!(!events.contains(SITE_LOCATED));
    }

    #[tokio::test]
    async fn test_transport_unavailable_when_nothing_fetches() {
        let mut mock = MockFetcher::new();
        mock.expect_fetch()
            .times(2)
            .returning(|url, _| FetchResult::failed(url, 0, 1.0));
        let events = CollectingEventSink::new();

        let report = locate(&mock, &events).await;

        assert!(matches!(
            report.outcome,
            Err(ScoutError::TransportUnavailable { .. })
        ));
        assert!(report.capture.listing_html.is_none());
    }
}
