//! Benchmarks for scoring and link extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use tenderscout::extract::ExtractorSet;
use tenderscout::scoring::RelevanceScorer;
use tenderscout::taxonomy::TermTaxonomy;
use tenderscout::testing::{listing_page, FIXTURE_HOST};

fn scoring_benchmark(c: &mut Criterion) {
    let scorer = RelevanceScorer::new(Arc::new(TermTaxonomy::builtin().unwrap()));
    let body = "Provision of aerial inspection services for transmission assets, \
                including thermography of substation equipment and vegetation \
                survey along distribution corridors. "
        .repeat(20);

    c.bench_function("assess_detail", |b| {
        b.iter(|| scorer.assess(black_box("Drone LiDAR inspection of 66kV substation"), black_box(&body)))
    });
}

fn extraction_benchmark(c: &mut Criterion) {
    let extractors = ExtractorSet::standard().unwrap();
    let links: Vec<(String, String)> = (0..200)
        .map(|i| (format!("/tender/view/{i}"), format!("Tender number {i}")))
        .collect();
    let refs: Vec<(&str, &str)> = links.iter().map(|(h, t)| (h.as_str(), t.as_str())).collect();
    let html = listing_page(&refs);

    c.bench_function("extract_listing_200", |b| {
        b.iter(|| extractors.extract(black_box(&html), FIXTURE_HOST))
    });
}

criterion_group!(benches, scoring_benchmark, extraction_benchmark);
criterion_main!(benches);
