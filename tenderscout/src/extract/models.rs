//! Data models produced by link and detail extraction.

use serde::{Deserialize, Serialize};

/// How a candidate link was discovered in the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMethod {
    /// A plain `href` attribute.
    Anchor,
    /// A navigate-to data attribute such as `data-href`.
    DataAttribute,
    /// A `location = '...'` assignment inside an inline event handler.
    ScriptNavigation,
}

impl DiscoveryMethod {
    /// Stable string form, used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::DataAttribute => "data-attribute",
            Self::ScriptNavigation => "script-navigation",
        }
    }
}

impl std::fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link-like reference found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// Absolute URL with the fragment stripped.
    pub url: String,
    /// Visible text of the element carrying the reference.
    #[serde(default)]
    pub text: String,
    /// Which strategy found it.
    pub method: DiscoveryMethod,
}

impl CandidateLink {
    /// Creates a candidate link.
    #[must_use]
    pub fn new(url: impl Into<String>, text: impl Into<String>, method: DiscoveryMethod) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            method,
        }
    }
}

/// Title and body text of a sampled detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailText {
    /// Page heading.
    pub title: String,
    /// Main text content.
    pub body: String,
}

impl DetailText {
    /// Creates detail text.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_method_serializes_kebab_case() {
        let json = serde_json::to_string(&DiscoveryMethod::ScriptNavigation).unwrap();
        assert_eq!(json, "\"script-navigation\"");
        assert_eq!(DiscoveryMethod::DataAttribute.to_string(), "data-attribute");
    }

    #[test]
    fn test_detail_text_empty() {
        assert!(DetailText::default().is_empty());
        assert!(!DetailText::new("Title", "").is_empty());
    }
}
