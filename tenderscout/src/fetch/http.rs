//! `reqwest`-backed fetcher with an explicit trust-downgrade policy.

use async_trait::async_trait;
use std::error::Error as _;
use std::time::{Duration, Instant};

use super::protocols::{FetchResult, Fetcher, TrustLevel};
use crate::config::FetchConfig;
use crate::errors::{Result, ScoutError};

/// Ordered trust levels to attempt.
///
/// The next level is only tried after a transport-level failure (connect,
/// TLS handshake). An HTTP error status never triggers another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPolicy {
    attempts: Vec<TrustLevel>,
}

impl TrustPolicy {
    /// Verified first, then exactly one unverified retry.
    #[must_use]
    pub fn downgrade_on_transport_failure() -> Self {
        Self {
            attempts: vec![TrustLevel::Verified, TrustLevel::Unverified],
        }
    }

    /// A single verified attempt.
    #[must_use]
    pub fn verified_only() -> Self {
        Self {
            attempts: vec![TrustLevel::Verified],
        }
    }

    /// The attempts, in order.
    #[must_use]
    pub fn attempts(&self) -> &[TrustLevel] {
        &self.attempts
    }

    /// Whether the unverified level is ever used.
    #[must_use]
    pub fn allows_unverified(&self) -> bool {
        self.attempts.contains(&TrustLevel::Unverified)
    }
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::downgrade_on_transport_failure()
    }
}

/// HTTP fetcher holding one client per trust level.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    verified: reqwest::Client,
    unverified: Option<reqwest::Client>,
    policy: TrustPolicy,
}

impl HttpFetcher {
    /// Builds a fetcher with the default trust policy.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Self::with_policy(config, TrustPolicy::default())
    }

    /// Builds a fetcher with a custom trust policy.
    pub fn with_policy(config: &FetchConfig, policy: TrustPolicy) -> Result<Self> {
        let verified = build_client(config, false)?;
        let unverified = if policy.allows_unverified() {
            Some(build_client(config, true)?)
        } else {
            None
        };
        Ok(Self {
            verified,
            unverified,
            policy,
        })
    }

    fn client_for(&self, level: TrustLevel) -> &reqwest::Client {
        match level {
            TrustLevel::Verified => &self.verified,
            TrustLevel::Unverified => self.unverified.as_ref().unwrap_or(&self.verified),
        }
    }
}

fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
        .timeout(config.timeout())
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| ScoutError::config(format!("failed to build HTTP client: {e}")))
}

/// Connect and handshake failures qualify for the next trust level.
/// Timeouts do not: a second attempt would only double the wait.
fn is_transport_failure(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return false;
    }
    if err.is_connect() {
        return true;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string().to_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|needle| msg.contains(needle))
        {
            return true;
        }
        source = cause.source();
    }
    false
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let started = Instant::now();
        let attempts = self.policy.attempts();

        for (index, level) in attempts.iter().copied().enumerate() {
            let response = self
                .client_for(level)
                .get(url)
                .timeout(timeout)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let final_url = resp.url().to_string();
                    if !resp.status().is_success() {
                        tracing::debug!(url, status, "Non-success status");
                        return FetchResult::failed(url, status, elapsed_ms(started));
                    }
                    let content_type = resp
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    return match resp.text().await {
                        Ok(text) => FetchResult {
                            url: url.to_string(),
                            status_code: status,
                            text,
                            final_url,
                            content_type,
                            trust: Some(level),
                            duration_ms: elapsed_ms(started),
                        },
                        Err(e) => {
                            tracing::debug!(url, error = %e, "Failed to read body");
                            FetchResult::failed(url, 0, elapsed_ms(started))
                        }
                    };
                }
                Err(e) => {
                    let has_next = index + 1 < attempts.len();
                    if has_next && is_transport_failure(&e) {
                        tracing::warn!(
                            url,
                            error = %e,
                            "Transport failure, retrying with certificate verification disabled"
                        );
                        continue;
                    }
                    tracing::debug!(url, error = %e, "Fetch failed");
                    return FetchResult::failed(url, 0, elapsed_ms(started));
                }
            }
        }

        FetchResult::failed(url, 0, elapsed_ms(started))
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
