//! End-to-end runs of the site pipeline over canned portals.

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;

use tenderscout::events::{
    CollectingEventSink, DETAIL_SAMPLED, LISTING_DUPLICATE_PAGE, LISTING_PAGE, SITE_COMPLETED,
    SITE_LOCATED,
};
use tenderscout::prelude::*;
use tenderscout::testing::{detail_page, fast_config, fixture_profile, listing_page, StaticFetcher};

const PAGE_1: &str = "https://portal.test/tenders?status=open";
const PAGE_2: &str = "https://portal.test/tenders?status=open&page=2";
const PAGE_3: &str = "https://portal.test/tenders?status=open&page=3";

fn portal() -> StaticFetcher {
    StaticFetcher::new()
        .with_page(
            PAGE_1,
            listing_page(&[
                ("/tender/view/1", "Drone thermography of solar array"),
                ("/tender/view/2", "Details"),
                ("/tender/view/3#docs", "Office fit-out"),
            ]),
        )
        .with_page(
            PAGE_2,
            listing_page(&[
                ("/tender/view/3", "Office fit-out (repeat)"),
                ("/tender/view/4", "UAV wind turbine blade inspection"),
            ]),
        )
        // Page 3 repeats page 2, so the walk stops there.
        .with_page(
            PAGE_3,
            listing_page(&[
                ("/tender/view/4", "UAV wind turbine blade inspection"),
                ("/tender/view/3", "Office fit-out (repeat)"),
            ]),
        )
        .with_page(
            "https://portal.test/tender/view/2",
            detail_page("Drone LiDAR inspection of 66kV substation", "Aerial survey required."),
        )
}

fn read_json(dir: &std::path::Path, name: &str) -> Value {
    let raw = std::fs::read_to_string(dir.join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_full_site_run_writes_artifacts_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let events = Arc::new(CollectingEventSink::new());
    let fetcher = Arc::new(portal());
    let context = RunContext::new(
        fast_config(dir.path()).with_pages(5),
        fetcher.clone(),
        Arc::new(TermTaxonomy::builtin().unwrap()),
    )
    .unwrap()
    .with_events(events.clone());

    let profile = fixture_profile("Portal").with_near_miss(true);
    let report = SiteEngine::new(profile, Arc::new(context)).run().await;

    assert_eq!(report.outcome, SiteOutcome::Completed);
    // Fragment-only differences collapse onto one opportunity.
    assert_eq!(report.raw_count, 4);
    assert_eq!(fetcher.call_count(PAGE_3), 1);

    let raw = read_json(dir.path(), "portal-raw.json");
    let titles: Vec<&str> = raw
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles[0], "Drone LiDAR inspection of 66kV substation");
    assert!(titles.contains(&"Office fit-out"));
    assert!(!titles.contains(&"Office fit-out (repeat)"));

    let scores: Vec<u64> = raw
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["score"].as_u64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let links = read_json(dir.path(), "portal-links.json");
    let links = links.as_array().unwrap();
    assert!(links.iter().all(|r| r["include"] == Value::Bool(true)));
    assert!(links.iter().all(|r| r["classification"] == "strict"));
    assert_eq!(links.len(), 3);

    assert!(events.contains(SITE_LOCATED));
    assert!(events.contains(LISTING_DUPLICATE_PAGE));
    assert!(events.contains(DETAIL_SAMPLED));
    assert!(events.contains(SITE_COMPLETED));
    assert_eq!(events.events_of_type(LISTING_PAGE).len(), 2);
}

async fn run_portal_once(dir: &std::path::Path) -> String {
    let context = RunContext::new(
        fast_config(dir).with_pages(5),
        Arc::new(portal()),
        Arc::new(TermTaxonomy::builtin().unwrap()),
    )
    .unwrap();
    SiteEngine::new(fixture_profile("Portal"), Arc::new(context))
        .run()
        .await;
    std::fs::read_to_string(dir.join("portal-raw.json")).unwrap()
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_portal_once(dir.path()).await;
    let second = run_portal_once(dir.path()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_lenient_mode_includes_any_positive_score() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        strict_required: false,
        ..fast_config(dir.path()).with_pages(1).with_detail_limit(0)
    };
    let fetcher = StaticFetcher::new().with_page(
        PAGE_1,
        listing_page(&[
            ("/tender/view/1", "Solar farm vegetation maintenance"),
            ("/tender/view/2", "Office cleaning"),
        ]),
    );
    let context = RunContext::new(
        config,
        Arc::new(fetcher),
        Arc::new(TermTaxonomy::builtin().unwrap()),
    )
    .unwrap();

    let report = SiteEngine::new(fixture_profile("Portal"), Arc::new(context))
        .run()
        .await;

    assert!(!report.fallback_used);
    let links = read_json(dir.path(), "portal-links.json");
    assert_eq!(links.as_array().unwrap().len(), 1);
    assert_eq!(links[0]["title"], "Solar farm vegetation maintenance");
}

#[tokio::test]
async fn test_unfiltered_mode_writes_every_record() {
    let collected = Arc::new(CollectingSink::new());
    let config = RunConfig {
        only_filtered: false,
        ..fast_config(".").with_pages(1).with_detail_limit(0)
    };
    let fetcher = StaticFetcher::new().with_page(
        PAGE_1,
        listing_page(&[
            ("/tender/view/1", "Drone survey"),
            ("/tender/view/2", "Office cleaning"),
        ]),
    );
    let context = RunContext::new(
        config,
        Arc::new(fetcher),
        Arc::new(TermTaxonomy::builtin().unwrap()),
    )
    .unwrap()
    .with_artifacts(collected.clone());

    SiteEngine::new(fixture_profile("Portal"), Arc::new(context))
        .run()
        .await;

    assert_eq!(collected.json("portal-links.json"), collected.json("portal-raw.json"));
}

#[tokio::test]
async fn test_batch_over_mixed_sites() {
    let collected = Arc::new(CollectingSink::new());
    let fetcher = StaticFetcher::new().with_page(
        PAGE_1,
        listing_page(&[("/tender/view/1", "Drone survey")]),
    );
    let context = RunContext::new(
        fast_config(".").with_pages(1),
        Arc::new(fetcher),
        Arc::new(TermTaxonomy::builtin().unwrap()),
    )
    .unwrap()
    .with_artifacts(collected.clone());

    let unreachable = SiteProfile::new("Down", "https://down.test")
        .with_path("/tenders")
        .with_detail_rule(DetailLinkRule::new().requiring("/tender/view/"));
    let summary = run_batch(
        Arc::new(context),
        vec![fixture_profile("Portal"), unreachable],
    )
    .await;

    assert_eq!(summary.sites[0].outcome, SiteOutcome::Completed);
    assert_eq!(summary.sites[1].outcome, SiteOutcome::TransportUnavailable);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(collected.json("down-raw.json"), Some(serde_json::json!([])));
    assert!(summary.finished_at >= summary.started_at);
}
