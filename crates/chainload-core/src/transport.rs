//! The `QueryTransport` trait — how a named query reaches the node.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::request::QueryRequest;

/// Which HTTP shape a transport uses for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// `GET {query_url}?type=<name>`
    #[default]
    Get,
    /// `POST {query_url}` with `{"type":"<name>"}`
    Post,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            other => Err(format!("unknown transport '{other}' (expected get or post)")),
        }
    }
}

/// Sends a named query and returns the raw response body.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one instance is shared by every
/// operation of every batch.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn QueryTransport>`.
#[async_trait]
pub trait QueryTransport: Send + Sync + 'static {
    /// Send one query. Non-success statuses must come back as
    /// [`TransportError::Status`].
    async fn send_query(&self, req: &QueryRequest) -> Result<String, TransportError>;

    /// Return the transport's target URL.
    fn url(&self) -> &str;

    /// Return the HTTP shape this transport uses.
    fn kind(&self) -> TransportKind;
}
