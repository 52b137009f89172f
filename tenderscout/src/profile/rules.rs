//! Data-driven detail-link classification.

use serde::{Deserialize, Serialize};
use url::Url;

/// Decides whether a candidate URL is an opportunity-detail link.
///
/// All checks are case-insensitive substring checks on the absolute URL:
/// - the host contains one of `host_contains` (any host when empty),
/// - the URL contains every entry of `required_segments`,
/// - the URL ends with none of `exclude_suffixes`,
/// - and, when `detail_markers` or `id_params` are given, the URL contains
///   a marker or carries one of the identifier query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailLinkRule {
    /// Accepted host fragments.
    #[serde(default)]
    pub host_contains: Vec<String>,
    /// Fragments that must all be present.
    #[serde(default)]
    pub required_segments: Vec<String>,
    /// Detail-view fragments, any of which is sufficient evidence.
    #[serde(default)]
    pub detail_markers: Vec<String>,
    /// Identifier query parameter names, any of which is sufficient evidence.
    #[serde(default)]
    pub id_params: Vec<String>,
    /// Suffixes marking navigation chrome.
    #[serde(default)]
    pub exclude_suffixes: Vec<String>,
}

impl DetailLinkRule {
    /// Creates an empty rule matching every absolute URL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an accepted host fragment.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host_contains.push(host.into());
        self
    }

    /// Adds a required fragment.
    #[must_use]
    pub fn requiring(mut self, segment: impl Into<String>) -> Self {
        self.required_segments.push(segment.into());
        self
    }

    /// Adds a detail-view marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.detail_markers.push(marker.into());
        self
    }

    /// Adds an identifier query parameter.
    #[must_use]
    pub fn with_id_param(mut self, param: impl Into<String>) -> Self {
        self.id_params.push(param.into());
        self
    }

    /// Adds an excluded suffix.
    #[must_use]
    pub fn excluding_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.exclude_suffixes.push(suffix.into());
        self
    }

    /// Applies the rule.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let lower = url.to_lowercase();

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        if !self.host_contains.is_empty()
            && !self
                .host_contains
                .iter()
                .any(|h| host.contains(&h.to_lowercase()))
        {
            return false;
        }

        if !self
            .required_segments
            .iter()
            .all(|seg| lower.contains(&seg.to_lowercase()))
        {
            return false;
        }

        if self
            .exclude_suffixes
            .iter()
            .any(|suffix| lower.ends_with(&suffix.to_lowercase()))
        {
            return false;
        }

        if self.detail_markers.is_empty() && self.id_params.is_empty() {
            return true;
        }

        let has_marker = self
            .detail_markers
            .iter()
            .any(|marker| lower.contains(&marker.to_lowercase()));
        let has_id = parsed.query_pairs().any(|(key, value)| {
            !value.is_empty() && self.id_params.iter().any(|p| p.eq_ignore_ascii_case(&key))
        });
        has_marker || has_id
    }
}
