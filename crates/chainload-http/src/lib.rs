//! chainload-http — `reqwest` transports and BRID resolution for chainload.
//!
//! # Usage
//! ```rust,no_run
//! use chainload_core::{BatchRunner, LoadConfig, QueryRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), chainload_core::LoadError> {
//! let config = LoadConfig::for_url("https://node.example.com/");
//! let target = chainload_http::prepare(&config).await?;
//! let runner = BatchRunner::new(target.transport, config.batch_size)?;
//! let report = runner
//!     .run(&QueryRequest::new(&config.query), CancellationToken::new())
//!     .await;
//! println!("stopped after {} requests", report.total_requests);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod query;
pub mod resolver;

use std::sync::Arc;
use std::time::Duration;

use chainload_core::config::LoadConfig;
use chainload_core::endpoint::EndpointConfig;
use chainload_core::error::LoadError;
use chainload_core::policy::{ConcurrencyLimit, LimitedTransport};
use chainload_core::transport::{QueryTransport, TransportKind};

pub use client::{build_http_client, HttpClientConfig};
pub use query::{GetQueryTransport, PostQueryTransport};
pub use resolver::{fetch_brid, resolve_endpoint};

/// Build the query transport for `kind`, capped at `concurrency` open
/// requests when set.
pub fn build_transport(
    http: reqwest::Client,
    endpoint: &EndpointConfig,
    kind: TransportKind,
    request_timeout: Option<Duration>,
    concurrency: Option<usize>,
) -> Arc<dyn QueryTransport> {
    let transport: Arc<dyn QueryTransport> = match kind {
        TransportKind::Get => Arc::new(GetQueryTransport::new(http, endpoint, request_timeout)),
        TransportKind::Post => Arc::new(PostQueryTransport::new(http, endpoint, request_timeout)),
    };

    match concurrency {
        Some(max) => LimitedTransport::new(transport, ConcurrencyLimit::new(max)),
        None => transport,
    }
}

/// A resolved endpoint and the transport that queries it.
pub struct LoadTarget {
    pub endpoint: EndpointConfig,
    pub transport: Arc<dyn QueryTransport>,
}

/// Validate `config`, resolve the BRID and build the query transport.
///
/// Fails before any query is sent when the BRID cannot be fetched.
pub async fn prepare(config: &LoadConfig) -> Result<LoadTarget, LoadError> {
    config.validate()?;

    let http_config = HttpClientConfig::from(config);
    let http = build_http_client(&http_config)?;
    let endpoint = resolve_endpoint(&http, &config.base_url).await?;

    let transport = build_transport(
        http,
        &endpoint,
        config.transport,
        http_config.request_timeout,
        config.concurrency,
    );
    Ok(LoadTarget { endpoint, transport })
}
