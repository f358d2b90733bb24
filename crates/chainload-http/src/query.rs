//! GET and POST query transports against `{base}/query/{brid}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use chainload_core::endpoint::EndpointConfig;
use chainload_core::error::TransportError;
use chainload_core::request::QueryRequest;
use chainload_core::transport::{QueryTransport, TransportKind};

use crate::client::{map_reqwest_error, read_body};

/// `GET {query_url}?type=<name>`
pub struct GetQueryTransport {
    url: String,
    http: reqwest::Client,
    request_timeout: Option<Duration>,
}

impl GetQueryTransport {
    pub fn new(
        http: reqwest::Client,
        endpoint: &EndpointConfig,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: endpoint.query_url().to_string(),
            http,
            request_timeout,
        }
    }
}

#[async_trait]
impl QueryTransport for GetQueryTransport {
    async fn send_query(&self, req: &QueryRequest) -> Result<String, TransportError> {
        let resp = self
            .http
            .get(&self.url)
            .query(&req.query_pairs())
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.request_timeout))?;

        read_body(resp, self.request_timeout).await
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Get
    }
}

/// `POST {query_url}` with body `{"type":"<name>"}`.
pub struct PostQueryTransport {
    url: String,
    http: reqwest::Client,
    request_timeout: Option<Duration>,
}

impl PostQueryTransport {
    pub fn new(
        http: reqwest::Client,
        endpoint: &EndpointConfig,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            url: endpoint.query_url().to_string(),
            http,
            request_timeout,
        }
    }
}

#[async_trait]
impl QueryTransport for PostQueryTransport {
    async fn send_query(&self, req: &QueryRequest) -> Result<String, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.request_timeout))?;

        read_body(resp, self.request_timeout).await
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Post
    }
}
