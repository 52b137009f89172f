//! Shared collaborators of one batch run.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{DelayConfig, RunConfig};
use crate::errors::Result;
use crate::events::{EventSink, NoOpEventSink};
use crate::extract::ExtractorSet;
use crate::fetch::{Fetcher, HostLimiter, ThrottledFetcher};
use crate::output::{ArtifactSink, DirectorySink};
use crate::scoring::RelevanceScorer;
use crate::taxonomy::TermTaxonomy;

/// Everything the site pipelines share: configuration, the fetcher and its
/// host limiter, the compiled extractors and taxonomy, and the sinks.
///
/// Sites never mutate it; one `Arc<RunContext>` serves the whole batch.
pub struct RunContext {
    config: RunConfig,
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<HostLimiter>,
    extractors: ExtractorSet,
    scorer: RelevanceScorer,
    artifacts: Arc<dyn ArtifactSink>,
    events: Arc<dyn EventSink>,
}

impl RunContext {
    /// Validates `config` and builds the shared collaborators.
    ///
    /// Artifacts go to `config.output_dir`; events are discarded until a
    /// sink is set with [`RunContext::with_events`].
    pub fn new(
        config: RunConfig,
        fetcher: Arc<dyn Fetcher>,
        taxonomy: Arc<TermTaxonomy>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            limiter: Arc::new(HostLimiter::new(config.host_concurrency)),
            extractors: ExtractorSet::standard()?,
            scorer: RelevanceScorer::new(taxonomy),
            artifacts: Arc::new(DirectorySink::new(config.output_dir.clone())),
            events: Arc::new(NoOpEventSink),
            fetcher,
            config,
        })
    }

    /// Replaces the artifact sink.
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Arc<dyn ArtifactSink>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Link extractors.
    #[must_use]
    pub fn extractors(&self) -> &ExtractorSet {
        &self.extractors
    }

    /// Relevance scorer.
    #[must_use]
    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Artifact sink.
    #[must_use]
    pub fn artifacts(&self) -> &dyn ArtifactSink {
        self.artifacts.as_ref()
    }

    /// Event sink.
    #[must_use]
    pub fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Host limiter shared by every throttled fetcher of this run.
    #[must_use]
    pub fn limiter(&self) -> &Arc<HostLimiter> {
        &self.limiter
    }

    /// Request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.config.fetch.timeout()
    }

    /// Fetcher for sequential listing requests.
    #[must_use]
    pub fn listing_fetcher(&self) -> ThrottledFetcher {
        self.throttled(self.config.politeness.listing)
    }

    /// Fetcher for parallel detail requests.
    #[must_use]
    pub fn detail_fetcher(&self) -> ThrottledFetcher {
        self.throttled(self.config.politeness.detail)
    }

    fn throttled(&self, delay: DelayConfig) -> ThrottledFetcher {
        ThrottledFetcher::new(Arc::clone(&self.fetcher), Arc::clone(&self.limiter), delay)
    }

    /// Upper bound on one detail fetch including its wait for a host permit.
    ///
    /// At most `detail_workers` requests are in flight and each holds a
    /// permit for at most one request timeout plus one politeness delay.
    #[must_use]
    pub fn detail_deadline(&self) -> Duration {
        let delay = &self.config.politeness.detail;
        let per_request = self
            .request_timeout()
            .saturating_add(Duration::from_millis(delay.base_ms.saturating_add(delay.jitter_ms)));
        let waves = self
            .config
            .detail_workers
            .div_ceil(self.config.host_concurrency.max(1))
            .max(1);
        per_request.saturating_mul(u32::try_from(waves).unwrap_or(u32::MAX))
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("config", &self.config)
            .field("extractors", &self.extractors)
            .finish_non_exhaustive()
    }
}
