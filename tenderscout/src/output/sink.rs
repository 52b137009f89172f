//! Where artifacts end up.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Destination for named artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Writes (or replaces) the artifact `name`.
    async fn write(&self, name: &str, contents: String) -> Result<()>;
}

/// Writes artifacts as files in one directory, created on first write.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Creates a sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn write(&self, name: &str, contents: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, contents).await?;
        tracing::debug!(path = %path.display(), "Wrote artifact");
        Ok(())
    }
}

/// Keeps artifacts in memory. Used by tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    artifacts: Mutex<BTreeMap<String, String>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of an artifact.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.artifacts.lock().get(name).cloned()
    }

    /// An artifact parsed as JSON.
    #[must_use]
    pub fn json(&self, name: &str) -> Option<serde_json::Value> {
        self.get(name).and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Artifact names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.artifacts.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl ArtifactSink for CollectingSink {
    async fn write(&self, name: &str, contents: String) -> Result<()> {
        self.artifacts.lock().insert(name.to_string(), contents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("nested"));

        sink.write("vic-raw.json", "[]".to_string()).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("nested/vic-raw.json")).unwrap();
        assert_eq!(written, "[]");
    }

    #[tokio::test]
    async fn test_directory_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        sink.write("a.json", "1".to_string()).await.unwrap();
        sink.write("a.json", "2".to_string()).await.unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("a.json")).unwrap(), "2");
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        tokio_test::block_on(sink.write("b.json", "[1]".to_string())).unwrap();
        tokio_test::block_on(sink.write("a.html", "<p>".to_string())).unwrap();

        assert_eq!(sink.names(), vec!["a.html", "b.json"]);
        assert_eq!(sink.json("b.json"), Some(serde_json::json!([1])));
        assert_eq!(sink.json("a.html"), None);
        assert_eq!(sink.get("a.html").as_deref(), Some("<p>"));
    }
}
