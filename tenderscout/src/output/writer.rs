//! Per-site artifact naming and serialization.

use serde::Serialize;

use super::records::{DebugCandidate, NearMissRecord, OpportunityRecord};
use super::sink::ArtifactSink;
use crate::errors::Result;
use crate::extract::CandidateLink;
use crate::opportunity::ScoredOpportunity;

/// Writes one site's artifacts under its file stem.
pub struct SiteArtifacts<'a> {
    sink: &'a dyn ArtifactSink,
    stem: &'a str,
    site: &'a str,
}

impl<'a> SiteArtifacts<'a> {
    /// Creates a writer for `site`, naming files `<stem>-*.json`.
    #[must_use]
    pub fn new(sink: &'a dyn ArtifactSink, stem: &'a str, site: &'a str) -> Self {
        Self { sink, stem, site }
    }

    /// File name of an artifact kind.
    #[must_use]
    pub fn file_name(&self, kind: &str) -> String {
        format!("{}-{kind}", self.stem)
    }

    async fn write_json<T: Serialize + Sync + ?Sized>(&self, kind: &str, value: &T) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(value)?;
        contents.push('\n');
        self.sink.write(&self.file_name(kind), contents).await
    }

    /// Raw set: every scored opportunity.
    pub async fn write_raw(&self, records: &[ScoredOpportunity]) -> Result<()> {
        let rows: Vec<_> = records
            .iter()
            .map(|r| OpportunityRecord::new(r, self.site))
            .collect();
        self.write_json("raw.json", &rows).await
    }

    /// Filtered set.
    pub async fn write_filtered(&self, records: &[ScoredOpportunity]) -> Result<()> {
        let rows: Vec<_> = records
            .iter()
            .map(|r| OpportunityRecord::new(r, self.site))
            .collect();
        self.write_json("links.json", &rows).await
    }

    /// Near-miss set.
    pub async fn write_near(&self, records: &[ScoredOpportunity]) -> Result<()> {
        let rows: Vec<_> = records
            .iter()
            .map(|r| NearMissRecord::new(r, self.site))
            .collect();
        self.write_json("near.json", &rows).await
    }

    /// Empty arrays for every record artifact.
    pub async fn write_empty(&self, include_near: bool) -> Result<()> {
        self.write_raw(&[]).await?;
        self.write_filtered(&[]).await?;
        if include_near {
            self.write_near(&[]).await?;
        }
        Ok(())
    }

    /// Raw markup of the first listing page fetched.
    pub async fn write_listing_html(&self, html: &str) -> Result<()> {
        self.sink
            .write(&self.file_name("listing.html"), html.to_string())
            .await
    }

    /// Capped dump of extracted candidates with their detail classification.
    pub async fn write_debug_candidates<F>(
        &self,
        candidates: &[CandidateLink],
        cap: usize,
        is_detail: F,
    ) -> Result<()>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let rows: Vec<_> = candidates
            .iter()
            .take(cap)
            .map(|c| DebugCandidate::new(c, is_detail(&c.url)))
            .collect();
        self.write_json("debug-anchors.json", &rows).await
    }
}

impl std::fmt::Debug for SiteArtifacts<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteArtifacts")
            .field("stem", &self.stem)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DiscoveryMethod;
    use crate::output::CollectingSink;

    #[tokio::test]
    async fn test_empty_artifacts() {
        let sink = CollectingSink::new();
        let artifacts = SiteArtifacts::new(&sink, "vic", "VIC");

        artifacts.write_empty(true).await.unwrap();

        assert_eq!(sink.names(), vec!["vic-links.json", "vic-near.json", "vic-raw.json"]);
        assert_eq!(sink.json("vic-raw.json"), Some(serde_json::json!([])));
    }

    #[tokio::test]
    async fn test_empty_artifacts_without_near() {
        let sink = CollectingSink::new();
        SiteArtifacts::new(&sink, "nsw", "NSW").write_empty(false).await.unwrap();
        assert_eq!(sink.names(), vec!["nsw-links.json", "nsw-raw.json"]);
    }

    #[tokio::test]
    async fn test_debug_candidates_capped() {
        let sink = CollectingSink::new();
        let candidates: Vec<_> = (0..5)
            .map(|i| {
                CandidateLink::new(
                    format!("https://portal.test/tender/view/{i}"),
                    format!("T{i}"),
                    DiscoveryMethod::Anchor,
                )
            })
            .collect();

        SiteArtifacts::new(&sink, "vic", "VIC")
            .write_debug_candidates(&candidates, 3, |url| url.ends_with('1'))
            .await
            .unwrap();

        let dump = sink.json("vic-debug-anchors.json").unwrap();
        let rows = dump.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["detail"], true);
        assert_eq!(rows[0]["detail"], false);
    }

    #[tokio::test]
    async fn test_listing_html_written_verbatim() {
        let sink = CollectingSink::new();
        SiteArtifacts::new(&sink, "qld", "QLD")
            .write_listing_html("<html>x</html>")
            .await
            .unwrap();
        assert_eq!(sink.get("qld-listing.html").as_deref(), Some("<html>x</html>"));
    }
}
