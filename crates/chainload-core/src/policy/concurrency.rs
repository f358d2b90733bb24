//! Concurrency cap on simultaneously open requests.
//!
//! A whole batch is logically in flight at once; the cap only bounds how
//! many of those operations talk to the network at the same moment. The
//! rest wait on the semaphore.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::TransportError;
use crate::request::QueryRequest;
use crate::transport::{QueryTransport, TransportKind};

/// Counting limit shared by every request of a run.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimit {
    semaphore: Arc<Semaphore>,
    max: usize,
}

impl ConcurrencyLimit {
    /// `max` is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(max: usize) -> Self {
        let max = max.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, TransportError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| TransportError::Other("concurrency limiter closed".into()))
    }
}

/// Transport wrapper that holds a [`ConcurrencyLimit`] permit for the
/// duration of each query.
pub struct LimitedTransport {
    inner: Arc<dyn QueryTransport>,
    limit: ConcurrencyLimit,
}

impl LimitedTransport {
    pub fn new(inner: Arc<dyn QueryTransport>, limit: ConcurrencyLimit) -> Arc<Self> {
        Arc::new(Self { inner, limit })
    }

    pub fn limit(&self) -> &ConcurrencyLimit {
        &self.limit
    }
}

#[async_trait]
impl QueryTransport for LimitedTransport {
    async fn send_query(&self, req: &QueryRequest) -> Result<String, TransportError> {
        let _permit = self.limit.acquire().await?;
        self.inner.send_query(req).await
    }

    fn url(&self) -> &str {
        self.inner.url()
    }

    fn kind(&self) -> TransportKind {
        self.inner.kind()
    }
}
