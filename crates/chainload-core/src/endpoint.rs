//! Node endpoint URLs derived from the base URL and the resolved BRID.

/// Path of the BRID lookup for chain IID 0.
pub const BRID_PATH: &str = "brid/iid_0";

/// Path prefix of the query endpoint.
pub const QUERY_PATH: &str = "query";

/// URL of the startup BRID lookup: `{base}/brid/iid_0`.
pub fn brid_url(base_url: &str) -> String {
    format!("{}/{BRID_PATH}", trim_base(base_url))
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Immutable endpoint configuration, fixed once the BRID is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: String,
    brid: String,
    query_url: String,
}

impl EndpointConfig {
    /// Build from the base URL and a BRID taken verbatim from the node.
    pub fn new(base_url: impl Into<String>, brid: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let brid = brid.into();
        let query_url = format!("{}/{QUERY_PATH}/{brid}", trim_base(&base_url));
        Self {
            base_url,
            brid,
            query_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn brid(&self) -> &str {
        &self.brid
    }

    /// `{base}/query/{brid}`.
    pub fn query_url(&self) -> &str {
        &self.query_url
    }
}
