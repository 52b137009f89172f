//! Error types for the tenderscout pipeline.
//!
//! Only configuration and output failures ever reach a caller as hard
//! errors. Transport failures are absorbed by the fetcher, and the two
//! "nothing found" conditions of the locator are reported so the engine can
//! downgrade them to warnings plus empty artifacts.

use thiserror::Error;

/// The main error type for tenderscout operations.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// A network or TLS failure. Never propagated past the fetcher.
    #[error("Transport error for {url}: {reason}")]
    Transport {
        /// The URL being fetched.
        url: String,
        /// Human-readable cause.
        reason: String,
    },

    /// No candidate listing endpoint yielded a detail link.
    #[error("Layout mismatch for site {site}: no listing candidate yielded detail links")]
    LayoutMismatch {
        /// Site identifier.
        site: String,
    },

    /// Every listing candidate failed at the transport layer.
    #[error("Transport unavailable for site {site}: every listing candidate failed to fetch")]
    TransportUnavailable {
        /// Site identifier.
        site: String,
    },

    /// A URL in configuration could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending input.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A taxonomy pattern failed to compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Regex compile error.
        #[source]
        source: regex::Error,
    },

    /// Invalid run configuration or profile data.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the site pipeline ended early without
    /// anything to classify, as opposed to a real failure.
    #[must_use]
    pub fn is_early_termination(&self) -> bool {
        matches!(
            self,
            Self::LayoutMismatch { .. } | Self::TransportUnavailable { .. }
        )
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ScoutError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = ScoutError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mismatch_display() {
        let err = ScoutError::LayoutMismatch {
            site: "VIC".to_string(),
        };
        assert!(err.to_string().contains("VIC"));
        assert!(err.is_early_termination());
    }

    #[test]
    fn test_config_error_is_not_early_termination() {
        let err = ScoutError::config("pages must be positive");
        assert_eq!(err.to_string(), "Configuration error: pages must be positive");
        assert!(!err.is_early_termination());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ScoutError = io.into();
        assert!(matches!(err, ScoutError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: ScoutError = parsed.unwrap_err().into();
        assert!(matches!(err, ScoutError::Serialization(_)));
    }
}
