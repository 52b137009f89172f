//! Site profiles: every target portal is one configuration instance of the
//! same engine.
//!
//! A profile lists candidate hosts and listing paths, the pagination
//! parameter name, the detail-link rule and which optional artifacts the
//! site writes. Built-in profiles cover the VIC, QLD and NSW portals; more
//! can be loaded from TOML without new code.

mod builtin;
mod rules;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, ScoutError};

pub use builtin::{builtin_profiles, default_generic_labels, nsw, qld, vic};
pub use rules::DetailLinkRule;

/// One candidate listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEndpoint {
    host: String,
    path: String,
    pagination_param: String,
    url: Url,
}

impl ListingEndpoint {
    /// Resolves `path` against `host`.
    pub fn new(
        host: impl Into<String>,
        path: impl Into<String>,
        pagination_param: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let path = path.into();
        let invalid = |reason: String| ScoutError::InvalidUrl {
            url: format!("{host}{path}"),
            reason,
        };
        let base = Url::parse(&host).map_err(|e| invalid(e.to_string()))?;
        let mut url = base.join(&path).map_err(|e| invalid(e.to_string()))?;
        url.set_fragment(None);
        Ok(Self {
            host,
            path,
            pagination_param: pagination_param.into(),
            url,
        })
    }

    /// Base host, as configured.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Path template, as configured.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameter carrying the page number.
    #[must_use]
    pub fn pagination_param(&self) -> &str {
        &self.pagination_param
    }

    /// Absolute page-1 URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Absolute page-1 URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for ListingEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that distinguishes one target portal from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Site identifier written into every record (`VIC`).
    pub id: String,
    /// File name stem of the artifacts (`vic`).
    pub output_stem: String,
    /// Candidate hosts, probed in order.
    pub hosts: Vec<String>,
    /// Candidate listing paths, probed in order for each host.
    pub listing_paths: Vec<String>,
    /// Query parameter carrying the page number.
    #[serde(default = "default_pagination_param")]
    pub pagination_param: String,
    /// Detail-link classification.
    #[serde(default)]
    pub detail_rule: DetailLinkRule,
    /// Link texts too generic to use as a label.
    #[serde(default = "default_generic_labels")]
    pub generic_labels: Vec<String>,
    /// Whether the near-miss artifact is written.
    #[serde(default)]
    pub near_miss: bool,
    /// Whether the listing capture and candidate dump are written.
    #[serde(default)]
    pub diagnostics: bool,
}

fn default_pagination_param() -> String {
    "page".to_string()
}

impl SiteProfile {
    /// Creates a profile with one host and no paths.
    #[must_use]
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            output_stem: id.to_lowercase(),
            id,
            hosts: vec![host.into()],
            listing_paths: Vec::new(),
            pagination_param: default_pagination_param(),
            detail_rule: DetailLinkRule::default(),
            generic_labels: default_generic_labels(),
            near_miss: false,
            diagnostics: false,
        }
    }

    /// Adds a candidate host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Adds a candidate listing path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.listing_paths.push(path.into());
        self
    }

    /// Sets the pagination parameter.
    #[must_use]
    pub fn with_pagination_param(mut self, param: impl Into<String>) -> Self {
        self.pagination_param = param.into();
        self
    }

    /// Sets the detail-link rule.
    #[must_use]
    pub fn with_detail_rule(mut self, rule: DetailLinkRule) -> Self {
        self.detail_rule = rule;
        self
    }

    /// Sets the artifact file stem.
    #[must_use]
    pub fn with_output_stem(mut self, stem: impl Into<String>) -> Self {
        self.output_stem = stem.into();
        self
    }

    /// Enables the near-miss artifact.
    #[must_use]
    pub fn with_near_miss(mut self, enabled: bool) -> Self {
        self.near_miss = enabled;
        self
    }

    /// Enables the diagnostic artifacts.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Whether `url` is an opportunity-detail link for this site.
    #[must_use]
    pub fn is_detail_link(&self, url: &str) -> bool {
        self.detail_rule.matches(url)
    }

    /// Candidate endpoints in probe order: hosts outer, paths inner.
    pub fn endpoints(&self) -> Result<Vec<ListingEndpoint>> {
        let mut endpoints = Vec::with_capacity(self.hosts.len() * self.listing_paths.len());
        for host in &self.hosts {
            for path in &self.listing_paths {
                endpoints.push(ListingEndpoint::new(
                    host.as_str(),
                    path.as_str(),
                    self.pagination_param.as_str(),
                )?);
            }
        }
        Ok(endpoints)
    }

    /// Rejects profiles the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ScoutError::config("site profile needs an id"));
        }
        if self.output_stem.trim().is_empty()
            || self.output_stem.contains(['/', '\\'])
        {
            return Err(ScoutError::config(format!(
                "site {} has an invalid output stem '{}'",
                self.id, self.output_stem
            )));
        }
        if self.hosts.is_empty() || self.listing_paths.is_empty() {
            return Err(ScoutError::config(format!(
                "site {} needs at least one host and one listing path",
                self.id
            )));
        }
        if self.pagination_param.trim().is_empty() {
            return Err(ScoutError::config(format!(
                "site {} needs a pagination parameter",
                self.id
            )));
        }
        self.endpoints().map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    site: Vec<SiteProfile>,
}

/// Parses `[[site]]` tables from TOML and validates each profile.
pub fn load_profiles(input: &str) -> Result<Vec<SiteProfile>> {
    let file: ProfileFile = toml::from_str(input)?;
    if file.site.is_empty() {
        return Err(ScoutError::config("profile file defines no [[site]] tables"));
    }
    for profile in &file.site {
        profile.validate()?;
    }
    Ok(file.site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_resolution() {
        let endpoint =
            ListingEndpoint::new("https://buy.nsw.gov.au", "/opportunity/search?types=Tenders", "page")
                .unwrap();
        assert_eq!(endpoint.as_str(), "https://buy.nsw.gov.au/opportunity/search?types=Tenders");
        assert_eq!(endpoint.pagination_param(), "page");
        assert_eq!(endpoint.host(), "https://buy.nsw.gov.au");
    }

    #[test]
    fn test_invalid_host_rejected() {
        let err = ListingEndpoint::new("not a host", "/x", "page").unwrap_err();
        assert!(matches!(err, ScoutError::InvalidUrl { .. }));
    }

    #[test]
    fn test_endpoints_hosts_outer_paths_inner() {
        let profile = SiteProfile::new("T", "https://a.example")
            .with_host("https://b.example")
            .with_path("/one")
            .with_path("/two");
        let urls: Vec<_> = profile
            .endpoints()
            .unwrap()
            .iter()
            .map(|e| e.as_str().to_string())
            .collect();

        assert_eq!(
            urls,
            vec![
                "https://a.example/one",
                "https://a.example/two",
                "https://b.example/one",
                "https://b.example/two",
            ]
        );
    }

    #[test]
    fn test_validate() {
        let profile = SiteProfile::new("T", "https://a.example");
        assert!(profile.validate().is_err());
        assert!(profile.clone().with_path("/").validate().is_ok());
        assert!(profile.with_path("/").with_output_stem("../x").validate().is_err());
    }

    #[test]
    fn test_load_profiles_from_toml() {
        let profiles = load_profiles(
            r#"
[[site]]
id = "WA"
output_stem = "wa"
hosts = ["https://tenders.wa.example"]
listing_paths = ["/open", "/"]
pagination_param = "pg"
near_miss = true

[site.detail_rule]
required_segments = ["/tender/"]
id_params = ["tenderId"]
"#,
        )
        .unwrap();

        assert_eq!(profiles.len(), 1);
        let wa = &profiles[0];
        assert_eq!(wa.pagination_param, "pg");
        assert!(wa.near_miss);
        assert!(!wa.diagnostics);
        assert_eq!(wa.generic_labels, default_generic_labels());
        assert!(wa.is_detail_link("https://tenders.wa.example/tender/x?tenderid=4"));
        assert!(!wa.is_detail_link("https://tenders.wa.example/tender/x"));
    }

    #[test]
    fn test_load_profiles_rejects_empty_file() {
        assert!(matches!(load_profiles(""), Err(ScoutError::Config(_))));
    }
}
