//! Error types for query transports, BRID resolution and run setup.

use thiserror::Error;

/// Errors that can occur while sending a single query.
///
/// These never escape a query operation: the runner logs them and folds
/// them into the batch's pass/fail decision.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, reset, body read error, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if the server answered but with a non-success status.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// HTTP status code carried by a protocol error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The startup BRID lookup failed. Fatal: no load is generated.
#[derive(Debug, Error)]
#[error("failed to fetch BRID from {url}: {source}")]
pub struct ResolverError {
    pub url: String,
    #[source]
    pub source: TransportError,
}

/// Errors that prevent a load run from starting.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Invalid configuration (zero batch size, empty URL, ...).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The background load task panicked or was aborted.
    #[error("load task failed: {0}")]
    Task(String),
}
