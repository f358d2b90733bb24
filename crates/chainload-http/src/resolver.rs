//! Startup BRID lookup.
//!
//! The node serves the blockchain RID of chain IID 0 at `/brid/iid_0` as a
//! plain-text body. It has to be known before any query URL exists.

use chainload_core::endpoint::{brid_url, EndpointConfig};
use chainload_core::error::ResolverError;

use crate::client::{map_reqwest_error, read_body};

/// Fetch the BRID. The body is returned verbatim: no trimming, no parsing.
pub async fn fetch_brid(http: &reqwest::Client, base_url: &str) -> Result<String, ResolverError> {
    let url = brid_url(base_url);
    tracing::debug!(url = %url, "fetching BRID");

    let resp = match http.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            return Err(ResolverError {
                url,
                source: map_reqwest_error(e, None),
            })
        }
    };

    read_body(resp, None)
        .await
        .map_err(|source| ResolverError { url, source })
}

/// Fetch the BRID and derive the endpoint configuration from it.
pub async fn resolve_endpoint(
    http: &reqwest::Client,
    base_url: &str,
) -> Result<EndpointConfig, ResolverError> {
    let brid = fetch_brid(http, base_url).await?;
    let endpoint = EndpointConfig::new(base_url, brid);
    tracing::info!(
        brid = %endpoint.brid(),
        query_url = %endpoint.query_url(),
        "BRID fetched"
    );
    Ok(endpoint)
}
