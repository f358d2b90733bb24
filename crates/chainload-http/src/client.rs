//! Shared `reqwest` client construction and response handling.
//!
//! One client (and its connection pool) is built per run and shared by the
//! resolver and every query transport. It is never reconfigured afterwards.

use std::time::Duration;

use chainload_core::config::{LoadConfig, DEFAULT_TIMEOUT_SECS};
use chainload_core::error::{LoadError, TransportError};

/// Configuration for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout; `None` keeps reqwest's default (no timeout).
    pub request_timeout: Option<Duration>,
    /// Upper bound on idle pooled connections per host.
    pub max_connections: Option<usize>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_connections: None,
        }
    }
}

impl From<&LoadConfig> for HttpClientConfig {
    fn from(cfg: &LoadConfig) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            max_connections: cfg.concurrency,
        }
    }
}

/// Build the client every request of the run goes through.
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client, LoadError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(max) = config.max_connections {
        builder = builder.pool_max_idle_per_host(max);
    }
    builder.build().map_err(|e| LoadError::Client(e.to_string()))
}

/// Map a `reqwest` failure onto the transport taxonomy.
pub(crate) fn map_reqwest_error(e: reqwest::Error, timeout: Option<Duration>) -> TransportError {
    match timeout {
        Some(t) if e.is_timeout() => TransportError::Timeout {
            ms: u64::try_from(t.as_millis()).unwrap_or(u64::MAX),
        },
        _ => TransportError::Http(e.to_string()),
    }
}

/// Read the body as text; non-success statuses become
/// [`TransportError::Status`].
pub(crate) async fn read_body(
    resp: reqwest::Response,
    timeout: Option<Duration>,
) -> Result<String, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    resp.text().await.map_err(|e| map_reqwest_error(e, timeout))
}
