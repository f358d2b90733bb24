//! Background load session with explicit teardown.
//!
//! `start` spawns the runner on the current Tokio runtime; `stop` cancels it
//! and waits for the report. Dropping the session without either also
//! cancels the run.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::LoadError;
use crate::request::QueryRequest;
use crate::runner::{BatchRunner, RunReport};
use crate::stats::RunStats;

pub struct LoadSession {
    cancel: CancellationToken,
    handle: JoinHandle<RunReport>,
    stats: Arc<RunStats>,
    _teardown: DropGuard,
}

impl LoadSession {
    /// Spawn `runner` in the background. Must be called inside a Tokio runtime.
    pub fn start(runner: BatchRunner, query: QueryRequest) -> Self {
        let cancel = CancellationToken::new();
        let stats = Arc::clone(runner.stats());
        let token = cancel.clone();
        let handle = tokio::spawn(async move { runner.run(&query, token).await });

        Self {
            _teardown: cancel.clone().drop_guard(),
            cancel,
            handle,
            stats,
        }
    }

    /// Token that stops the run when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stats(&self) -> &Arc<RunStats> {
        &self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run to halt on its own.
    pub async fn join(self) -> Result<RunReport, LoadError> {
        let Self { handle, _teardown, .. } = self;
        handle.await.map_err(|e| LoadError::Task(e.to_string()))
    }

    /// Cancel the run and wait for its report.
    pub async fn stop(self) -> Result<RunReport, LoadError> {
        tracing::debug!("stopping load session");
        self.cancel.cancel();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::runner::HaltReason;
    use crate::transport::{QueryTransport, TransportKind};
    use async_trait::async_trait;
    use std::time::Duration;

    struct SlowOk;

    #[async_trait]
    impl QueryTransport for SlowOk {
        async fn send_query(&self, _req: &QueryRequest) -> Result<String, TransportError> {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok("[]".into())
        }
        fn url(&self) -> &str {
            "mock://slow"
        }
        fn kind(&self) -> TransportKind {
            TransportKind::Get
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl QueryTransport for AlwaysFail {
        async fn send_query(&self, _req: &QueryRequest) -> Result<String, TransportError> {
            Err(TransportError::Http("connection refused".into()))
        }
        fn url(&self) -> &str {
            "mock://down"
        }
        fn kind(&self) -> TransportKind {
            TransportKind::Post
        }
    }

    #[tokio::test]
    async fn stop_cancels_running_session() {
        let runner = BatchRunner::new(Arc::new(SlowOk), 8).unwrap();
        let session = LoadSession::start(runner, QueryRequest::new("q"));

        while session.stats().total() < 16 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let stats = Arc::clone(session.stats());
        let report = session.stop().await.unwrap();

        assert_eq!(report.halt, HaltReason::Cancelled);
        assert_eq!(stats.active(), 0);
        assert_eq!(report.total_requests, stats.total());
    }

    #[tokio::test]
    async fn join_returns_failure_report() {
        let runner = BatchRunner::new(Arc::new(AlwaysFail), 3).unwrap();
        let session = LoadSession::start(runner, QueryRequest::new("q"));

        let report = session.join().await.unwrap();
        assert_eq!(report.halt, HaltReason::Failed);
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.failed_requests, 3);
    }

    #[tokio::test]
    async fn dropping_session_cancels_run() {
        let runner = BatchRunner::new(Arc::new(SlowOk), 2).unwrap();
        let session = LoadSession::start(runner, QueryRequest::new("q"));
        let token = session.cancel_token();

        drop(session);
        assert!(token.is_cancelled());
    }
}
