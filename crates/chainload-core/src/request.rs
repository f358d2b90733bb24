//! Query wire type.

use serde::{Deserialize, Serialize};

/// A named query against the node's `/query/{brid}` endpoint.
///
/// Serializes to `{"type":"<name>"}` for POST bodies; GET transports send
/// the same name as the `type` query-string parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(rename = "type")]
    pub query_type: String,
}

impl QueryRequest {
    pub fn new(query_type: impl Into<String>) -> Self {
        Self {
            query_type: query_type.into(),
        }
    }

    /// Query-string pairs for the GET transport.
    pub fn query_pairs(&self) -> [(&'static str, &str); 1] {
        [("type", self.query_type.as_str())]
    }
}

impl std::fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.query_type)
    }
}
