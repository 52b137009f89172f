//! Link extraction strategies.
//!
//! Target sites render opportunity links three different ways, so three
//! strategies run over every listing page and their outputs are
//! concatenated in a fixed order: anchors, data attributes, script
//! navigation. Nothing here deduplicates; that is the aggregator's job.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::models::{CandidateLink, DiscoveryMethod};
use super::text::visible_text;
use crate::errors::{Result, ScoutError};

/// Capability interface shared by every extraction strategy.
pub trait LinkExtractor: Send + Sync {
    /// The discovery method this strategy reports.
    fn method(&self) -> DiscoveryMethod;

    /// Extracts candidate links from a parsed document.
    fn extract(&self, document: &Html, base: &Url) -> Vec<CandidateLink>;
}

/// Resolves a raw reference against `base` and drops the fragment.
#[must_use]
pub fn resolve_url(base: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut url = base.join(raw).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::config(format!("invalid selector '{css}': {e}")))
}

fn collect_by_attribute(
    document: &Html,
    selector: &Selector,
    attribute: &str,
    base: &Url,
    method: DiscoveryMethod,
) -> Vec<CandidateLink> {
    document
        .select(selector)
        .filter_map(|el| {
            let raw = el.value().attr(attribute)?;
            let url = resolve_url(base, raw)?;
            Some(CandidateLink::new(url, visible_text(el), method))
        })
        .collect()
}

/// Every element with an `href` attribute.
#[derive(Debug, Clone)]
pub struct AnchorStrategy {
    selector: Selector,
}

impl AnchorStrategy {
    /// Creates the anchor strategy.
    pub fn new() -> Result<Self> {
        Ok(Self {
            selector: parse_selector("[href]")?,
        })
    }
}

impl LinkExtractor for AnchorStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::Anchor
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CandidateLink> {
        collect_by_attribute(document, &self.selector, "href", base, self.method())
    }
}

/// Elements exposing a navigate-to data attribute (clickable table rows).
#[derive(Debug, Clone)]
pub struct DataAttributeStrategy {
    attribute: String,
    selector: Selector,
}

impl DataAttributeStrategy {
    /// Creates the strategy for `data-href`.
    pub fn new() -> Result<Self> {
        Self::for_attribute("data-href")
    }

    /// Creates the strategy for a custom attribute name.
    pub fn for_attribute(attribute: impl Into<String>) -> Result<Self> {
        let attribute = attribute.into();
        let selector = parse_selector(&format!("[{attribute}]"))?;
        Ok(Self {
            attribute,
            selector,
        })
    }
}

impl LinkExtractor for DataAttributeStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::DataAttribute
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CandidateLink> {
        collect_by_attribute(document, &self.selector, &self.attribute, base, self.method())
    }
}

/// `location = '...'` / `location.href = '...'` inside `onclick` handlers.
///
/// The URL is pulled out with a pattern; no script is executed.
#[derive(Debug, Clone)]
pub struct ScriptNavigationStrategy {
    selector: Selector,
    pattern: Regex,
}

/// Matches `location = '<url>'`, `location.href = "<url>"` and the
/// `window.`/`document.` prefixed forms.
pub const LOCATION_ASSIGNMENT: &str = r#"\blocation(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#;

impl ScriptNavigationStrategy {
    /// Creates the strategy for `onclick` handlers.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(LOCATION_ASSIGNMENT).map_err(|source| ScoutError::Pattern {
            pattern: LOCATION_ASSIGNMENT.to_string(),
            source,
        })?;
        Ok(Self {
            selector: parse_selector("[onclick]")?,
            pattern,
        })
    }

    fn target<'a>(&self, handler: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(handler)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    fn candidate(&self, el: ElementRef<'_>, base: &Url) -> Option<CandidateLink> {
        let handler = el.value().attr("onclick")?;
        let url = resolve_url(base, self.target(handler)?)?;
        Some(CandidateLink::new(url, visible_text(el), self.method()))
    }
}

impl LinkExtractor for ScriptNavigationStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::ScriptNavigation
    }

    fn extract(&self, document: &Html, base: &Url) -> Vec<CandidateLink> {
        document
            .select(&self.selector)
            .filter_map(|el| self.candidate(el, base))
            .collect()
    }
}

/// Ordered set of strategies run unconditionally over each page.
pub struct ExtractorSet {
    strategies: Vec<Box<dyn LinkExtractor>>,
}

impl ExtractorSet {
    /// Anchor, data-attribute and script-navigation strategies.
    pub fn standard() -> Result<Self> {
        Ok(Self::from_strategies(vec![
            Box::new(AnchorStrategy::new()?),
            Box::new(DataAttributeStrategy::new()?),
            Box::new(ScriptNavigationStrategy::new()?),
        ]))
    }

    /// Builds a set from custom strategies, kept in the given order.
    #[must_use]
    pub fn from_strategies(strategies: Vec<Box<dyn LinkExtractor>>) -> Self {
        Self { strategies }
    }

    /// Methods in execution order.
    #[must_use]
    pub fn methods(&self) -> Vec<DiscoveryMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Runs every strategy over `body` and concatenates the results.
    ///
    /// Returns nothing when the body is empty or the base URL is invalid.
    #[must_use]
    pub fn extract(&self, body: &str, base_url: &str) -> Vec<CandidateLink> {
        if body.trim().is_empty() {
            return Vec::new();
        }
        let Ok(base) = Url::parse(base_url) else {
            tracing::debug!(base_url, "Unparseable base URL, skipping extraction");
            return Vec::new();
        };
        let document = Html::parse_document(body);
        self.strategies
            .iter()
            .flat_map(|strategy| strategy.extract(&document, &base))
            .collect()
    }
}

impl std::fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorSet")
            .field("methods", &self.methods())
            .finish()
    }
}
