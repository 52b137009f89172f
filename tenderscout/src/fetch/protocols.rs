//! The fetch capability and its result type.

use async_trait::async_trait;
use std::time::Duration;

/// How much the transport trusted the peer for a given attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustLevel {
    /// Certificates verified.
    Verified,
    /// Certificate verification disabled.
    Unverified,
}

/// Result of a fetch operation.
///
/// A failed fetch is a value, not an error: the body is empty and
/// [`FetchResult::ok`] is false.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// The URL that was requested.
    pub url: String,
    /// HTTP status code, 0 when no response was received.
    pub status_code: u16,
    /// Response body as text.
    pub text: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// Content type from headers. Informational only.
    pub content_type: Option<String>,
    /// Trust level of the attempt that produced this result.
    pub trust: Option<TrustLevel>,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// A successful response body.
    #[must_use]
    pub fn success(url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status_code: 200,
            text: text.into(),
            content_type: None,
            trust: Some(TrustLevel::Verified),
            duration_ms: 0.0,
        }
    }

    /// The "no data" result.
    #[must_use]
    pub fn failed(url: impl Into<String>, status_code: u16, duration_ms: f64) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status_code,
            text: String::new(),
            content_type: None,
            trust: None,
            duration_ms,
        }
    }

    /// Whether the fetch was successful (2xx status after redirects).
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body, or an empty string when the fetch failed.
    #[must_use]
    pub fn body(&self) -> &str {
        if self.ok() {
            &self.text
        } else {
            ""
        }
    }
}

/// Protocol for retrieving a URL's markup.
///
/// Implementations own their retry policy and must never fail: any problem
/// is reported as [`FetchResult::failed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL within the given timeout.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}
