//! HTTP transport selection and the retrying JSON POST shared by all wire clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::kind::ProviderId;
use crate::constants::{DEFAULT_TIMEOUT_SECS, RETRY_BACKOFF_MS};
use crate::error::{Error, Result};

/// Longest error body kept in a [`Error::Request`] message.
const MAX_ERROR_BODY: usize = 512;

/// The HTTP transport a provider client is built on.
#[derive(Debug, Clone, Default)]
pub enum Transport {
    /// A client with certificate verification, built by the provider.
    #[default]
    Verified,
    /// A pre-built client that accepts any certificate.
    Permissive(Client),
}

impl Transport {
    /// Builds a transport that skips TLS certificate verification.
    pub fn permissive(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()?;
        Ok(Self::Permissive(client))
    }

    pub fn is_permissive(&self) -> bool {
        matches!(self, Self::Permissive(_))
    }

    /// Returns the client to issue requests with.
    pub(crate) fn client(&self, timeout: Option<Duration>) -> reqwest::Result<Client> {
        match self {
            Self::Permissive(client) => Ok(client.clone()),
            Self::Verified => Client::builder()
                .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
                .build(),
        }
    }
}

/// Sends the request built by `make`, retrying transport failures, 429 and 5xx
/// responses up to `max_retries` times with linear backoff.
pub(crate) async fn post_json(
    provider: ProviderId,
    max_retries: u32,
    make: impl Fn() -> RequestBuilder,
) -> Result<Value> {
    let mut attempt: u32 = 0;
    loop {
        let failure = match make().send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(%provider, attempt, "request succeeded");
                return resp.json::<Value>().await.map_err(|e| Error::Request {
                    provider,
                    reason: format!("invalid response body: {e}"),
                });
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let reason = format!("status {status}: {}", truncate(&body));
                if !is_retryable(status) {
                    return Err(Error::Request { provider, reason });
                }
                reason
            }
            Err(e) => e.to_string(),
        };

        if attempt >= max_retries {
            return Err(Error::Request {
                provider,
                reason: format!("{failure} (after {} attempts)", attempt + 1),
            });
        }
        attempt += 1;
        warn!(%provider, attempt, max_retries, error = %failure, "retrying request");
        tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt))).await;
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
