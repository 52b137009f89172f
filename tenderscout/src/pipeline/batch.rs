//! Concurrent execution of several site pipelines.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::context::RunContext;
use super::engine::SiteEngine;
use super::report::{BatchSummary, SiteReport};
use crate::profile::SiteProfile;

/// Runs every profile concurrently and gathers one report per site.
///
/// Sites share the context's host limiter, so two profiles on the same host
/// still respect its concurrency cap. A panicking site is reported as
/// failed without affecting the others. Reports keep profile order.
pub async fn run_batch(context: Arc<RunContext>, profiles: Vec<SiteProfile>) -> BatchSummary {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, sites = profiles.len(), "Starting batch");

    let handles: Vec<(String, JoinHandle<SiteReport>)> = profiles
        .into_iter()
        .map(|profile| {
            let site = profile.id.clone();
            let engine = SiteEngine::new(profile, Arc::clone(&context));
            (site, tokio::spawn(async move { engine.run().await }))
        })
        .collect();

    let mut sites = Vec::with_capacity(handles.len());
    for (site, handle) in handles {
        match handle.await {
            Ok(report) => sites.push(report),
            Err(join_error) => {
                error!(%run_id, site = %site, error = %join_error, "Site task aborted");
                sites.push(SiteReport::failed(site, format!("task join error: {join_error}")));
            }
        }
    }

    let summary = BatchSummary {
        run_id,
        started_at,
        finished_at: Utc::now(),
        sites,
    };
    info!(
        %run_id,
        duration_ms = summary.duration_ms(),
        failed = summary.is_failure(),
        "Batch finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchResult, Fetcher};
    use crate::output::CollectingSink;
    use crate::pipeline::SiteOutcome;
    use crate::taxonomy::TermTaxonomy;
    use crate::testing::{fast_config, fixture_profile, listing_page, StaticFetcher};
    use async_trait::async_trait;
    use std::time::Duration;

    fn context(fetcher: Arc<dyn Fetcher>) -> (Arc<RunContext>, Arc<CollectingSink>) {
        let artifacts = Arc::new(CollectingSink::new());
        let context = RunContext::new(
            fast_config(".").with_pages(1),
            fetcher,
            Arc::new(TermTaxonomy::builtin().unwrap()),
        )
        .unwrap()
        .with_artifacts(artifacts.clone());
        (Arc::new(context), artifacts)
    }

    #[tokio::test]
    async fn test_reports_keep_profile_order() {
        let fetcher = StaticFetcher::new().with_page(
            "https://portal.test/tenders?status=open",
            listing_page(&[("/tender/view/1", "Drone survey")]),
        );
        let (ctx, artifacts) = context(Arc::new(fetcher));
        let profiles = vec![
            fixture_profile("B").with_output_stem("b"),
            fixture_profile("A").with_output_stem("a"),
        ];

        let summary = run_batch(ctx, profiles).await;

        let ids: Vec<_> = summary.sites.iter().map(|s| s.site.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert!(summary.sites.iter().all(|s| s.outcome == SiteOutcome::Completed));
        assert_eq!(summary.exit_code(), 0);
        assert!(artifacts.get("a-links.json").is_some());
        assert!(artifacts.get("b-links.json").is_some());
    }

    #[tokio::test]
    async fn test_all_unreachable_fails_batch() {
        let (ctx, _) = context(Arc::new(StaticFetcher::new()));
        let summary = run_batch(ctx, vec![fixture_profile("A"), fixture_profile("B")]).await;

        assert!(summary
            .sites
            .iter()
            .all(|s| s.outcome == SiteOutcome::TransportUnavailable));
        assert_eq!(summary.exit_code(), 1);
    }

    #[derive(Debug)]
    struct PanickingFetcher;

    #[async_trait]
    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult {
            assert!(!url.contains("boom"), "fetcher exploded");
            FetchResult::success(url, listing_page(&[("/tender/view/1", "Drone")]))
        }
    }

    #[tokio::test]
    async fn test_panicking_site_is_isolated() {
        let (ctx, _) = context(Arc::new(PanickingFetcher));
        let exploding = SiteProfile::new("X", "https://boom.test")
            .with_path("/")
            .with_detail_rule(crate::profile::DetailLinkRule::new().requiring("/tender/view/"));

        let summary = run_batch(ctx, vec![exploding, fixture_profile("A")]).await;

        assert!(matches!(summary.sites[0].outcome, SiteOutcome::Failed(_)));
        assert_eq!(summary.sites[1].outcome, SiteOutcome::Completed);
        assert_eq!(summary.exit_code(), 1);
    }
}
