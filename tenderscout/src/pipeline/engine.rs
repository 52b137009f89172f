//! One site's pipeline: locate, walk, aggregate, sample, score, classify,
//! write.

use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::aggregate::Aggregator;
use super::context::RunContext;
use super::locator::{LocateReport, ListingLocator};
use super::report::{SiteOutcome, SiteReport};
use super::sampler::DetailSampler;
use super::walk::ListingWalker;
use crate::errors::{Result, ScoutError};
use crate::events::{
    CLASSIFY_FALLBACK, DETAIL_SAMPLED, SITE_COMPLETED, SITE_FAILED, SITE_LAYOUT_MISMATCH,
    SITE_TRANSPORT_UNAVAILABLE,
};
use crate::opportunity::{ScoredOpportunity, UniqueOpportunity};
use crate::output::SiteArtifacts;
use crate::profile::SiteProfile;
use crate::scoring::{near_misses, rank, InclusionPolicy};

/// Runs the whole pipeline for one site profile.
#[derive(Debug, Clone)]
pub struct SiteEngine {
    profile: SiteProfile,
    context: Arc<RunContext>,
}

impl SiteEngine {
    /// Creates an engine for `profile`.
    #[must_use]
    pub fn new(profile: SiteProfile, context: Arc<RunContext>) -> Self {
        Self { profile, context }
    }

    /// The profile this engine runs.
    #[must_use]
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Runs the site. Never fails: errors become a `Failed` report.
    pub async fn run(&self) -> SiteReport {
        match self.execute().await {
            Ok(report) => report,
            Err(err) => {
                error!(site = %self.profile.id, error = %err, "Site pipeline failed");
                self.context.events().try_emit(
                    SITE_FAILED,
                    Some(json!({"site": self.profile.id, "error": err.to_string()})),
                );
                SiteReport::failed(self.profile.id.clone(), err.to_string())
            }
        }
    }

    fn write_near(&self) -> bool {
        self.profile.near_miss && self.context.config().write_near
    }

    fn artifacts(&self) -> SiteArtifacts<'_> {
        SiteArtifacts::new(
            self.context.artifacts(),
            &self.profile.output_stem,
            &self.profile.id,
        )
    }

    async fn execute(&self) -> Result<SiteReport> {
        let ctx = self.context.as_ref();
        let profile = &self.profile;
        let site = profile.id.as_str();
        let listing_fetcher = ctx.listing_fetcher();

        let report = ListingLocator::new(
            profile,
            &listing_fetcher,
            ctx.extractors(),
            ctx.events(),
            ctx.request_timeout(),
        )
        .locate()
        .await;
        self.write_diagnostics(&report).await?;

        let located = match report.outcome {
            Ok(located) => located,
            Err(err @ (ScoutError::LayoutMismatch { .. } | ScoutError::TransportUnavailable { .. })) => {
                return self.terminate_early(&err, report.probes).await;
            }
            Err(err) => return Err(err),
        };

        let walk = ListingWalker::new(
            profile,
            &listing_fetcher,
            ctx.extractors(),
            ctx.events(),
            ctx.request_timeout(),
            ctx.config().pages,
        )
        .walk(located)
        .await;

        let mut aggregator = Aggregator::new(profile.generic_labels.clone());
        aggregator.extend(walk.detail_links());
        let opportunities = aggregator.into_opportunities();
        info!(site, pages = walk.pages.len(), unique = opportunities.len(), "Aggregated detail links");

        let sampler = DetailSampler::new(
            Arc::new(ctx.detail_fetcher()),
            ctx.request_timeout(),
            ctx.detail_deadline(),
            ctx.config().detail_workers,
            ctx.config().detail_limit,
        );
        let opportunities = sampler.sample(opportunities).await;
        let sampled = opportunities.iter().filter(|o| o.detail.is_some()).count();
        info!(site, sampled, "Sampled detail pages");
        ctx.events().try_emit(
            DETAIL_SAMPLED,
            Some(json!({"site": site, "sampled": sampled, "unique": opportunities.len()})),
        );

        let policy = InclusionPolicy::from_config(ctx.config());
        let mut scored = self.score(opportunities, &policy);
        rank(&mut scored);
        let near = near_misses(&scored);
        let filtered = policy.select(&scored);

        if filtered.is_fallback() {
            warn!(
                site,
                kept = filtered.records().len(),
                "Nothing passed inclusion, keeping the top-ranked records"
            );
            ctx.events().try_emit(
                CLASSIFY_FALLBACK,
                Some(json!({"site": site, "kept": filtered.records().len()})),
            );
        }

        let artifacts = self.artifacts();
        artifacts.write_raw(&scored).await?;
        artifacts.write_filtered(filtered.records()).await?;
        if self.write_near() {
            artifacts.write_near(&near).await?;
        }

        let report = SiteReport {
            site: site.to_string(),
            outcome: SiteOutcome::Completed,
            raw_count: scored.len(),
            filtered_count: filtered.records().len(),
            near_count: near.len(),
            fallback_used: filtered.is_fallback(),
        };
        info!(
            site,
            raw = report.raw_count,
            filtered = report.filtered_count,
            near = report.near_count,
            "Site completed"
        );
        ctx.events().try_emit(
            SITE_COMPLETED,
            Some(json!({
                "site": site,
                "raw": report.raw_count,
                "filtered": report.filtered_count,
                "near": report.near_count,
                "fallback": report.fallback_used,
            })),
        );
        Ok(report)
    }

    fn score(
        &self,
        opportunities: Vec<UniqueOpportunity>,
        policy: &InclusionPolicy,
    ) -> Vec<ScoredOpportunity> {
        let scorer = self.context.scorer();
        opportunities
            .into_iter()
            .map(|opportunity| {
                let assessment = scorer.assess(opportunity.title(), opportunity.body());
                ScoredOpportunity {
                    include: policy.includes(&assessment),
                    assessment,
                    opportunity,
                }
            })
            .collect()
    }

    async fn write_diagnostics(&self, report: &LocateReport) -> Result<()> {
        if !self.profile.diagnostics {
            return Ok(());
        }
        let artifacts = self.artifacts();
        artifacts
            .write_listing_html(report.capture.listing_html.as_deref().unwrap_or_default())
            .await?;
        artifacts
            .write_debug_candidates(
                &report.capture.candidates,
                self.context.config().diagnostics_cap,
                |url| self.profile.is_detail_link(url),
            )
            .await
    }

    async fn terminate_early(&self, err: &ScoutError, probes: usize) -> Result<SiteReport> {
        let site = self.profile.id.as_str();
        let (event, outcome) = match err {
            ScoutError::TransportUnavailable { .. } => {
                (SITE_TRANSPORT_UNAVAILABLE, SiteOutcome::TransportUnavailable)
            }
            _ => (SITE_LAYOUT_MISMATCH, SiteOutcome::LayoutMismatch),
        };

        warn!(site, probes, error = %err, "No detail links found; writing empty artifacts");
        self.context.events().try_emit(
            event,
            Some(json!({"site": site, "probes": probes, "error": err.to_string()})),
        );
        self.artifacts().write_empty(self.write_near()).await?;
        Ok(SiteReport::new(site, outcome))
    }
}
