//! Batch load runner: fire `batch_size` concurrent queries, wait for all of
//! them, repeat until a batch contains a failure.
//!
//! There is no backoff between batches and no retry of failed queries. The
//! first failing batch is the result being measured, so the runner reports
//! it and stops for good.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::LoadError;
use crate::request::QueryRequest;
use crate::stats::{RunStats, StatsSnapshot};
use crate::transport::QueryTransport;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A batch contained at least one failed query.
    Failed,
    /// The session was stopped from outside.
    Cancelled,
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Emitted once per finished batch, after the bulk join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// 1-based batch number.
    pub index: u64,
    /// Operations launched in this batch.
    pub size: usize,
    /// Operations that reported failure.
    pub failures: usize,
    /// Counters as seen right after the batch joined.
    pub stats: StatsSnapshot,
}

impl BatchSummary {
    pub fn succeeded(&self) -> bool {
        self.failures == 0
    }
}

/// Final outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub halt: HaltReason,
    /// Batches in which every query succeeded.
    pub batches_completed: u64,
    /// Queries issued over the whole run, the terminal batch included.
    pub total_requests: u64,
    /// Failed queries in the terminal batch.
    pub failed_requests: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn requests_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_requests as f64 / secs
        } else {
            0.0
        }
    }
}

/// Send one query, keeping the run counters in step.
///
/// Every error is logged and turned into `false`; nothing propagates past
/// this call. The response body is logged when `log_body` is set.
pub async fn send_query(
    transport: &dyn QueryTransport,
    stats: &Arc<RunStats>,
    req: &QueryRequest,
    log_body: bool,
) -> bool {
    let _in_flight = stats.begin();

    match transport.send_query(req).await {
        Ok(body) => {
            if log_body {
                tracing::info!(query = %req, body = %body, "query result");
            }
            true
        }
        Err(e) => {
            tracing::warn!(
                query = %req,
                error = %e,
                url = %transport.url(),
                "query failed"
            );
            false
        }
    }
}

/// Drives batches of concurrent queries against one transport.
pub struct BatchRunner {
    transport: Arc<dyn QueryTransport>,
    stats: Arc<RunStats>,
    batch_size: usize,
    progress: Option<mpsc::UnboundedSender<BatchSummary>>,
}

impl BatchRunner {
    pub fn new(transport: Arc<dyn QueryTransport>, batch_size: usize) -> Result<Self, LoadError> {
        if batch_size == 0 {
            return Err(LoadError::Config("batch size must be at least 1".into()));
        }
        Ok(Self {
            transport,
            stats: RunStats::new(),
            batch_size,
            progress: None,
        })
    }

    /// Use externally owned counters instead of fresh ones.
    pub fn with_stats(mut self, stats: Arc<RunStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Receive a [`BatchSummary`] after every batch.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<BatchSummary>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn stats(&self) -> &Arc<RunStats> {
        &self.stats
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run batches until one fails or `cancel` fires.
    ///
    /// Cancelling mid-batch drops the in-flight queries; their counters are
    /// still released.
    pub async fn run(&self, query: &QueryRequest, cancel: CancellationToken) -> RunReport {
        let started = Instant::now();
        let mut batches_completed = 0u64;

        tracing::info!(
            query = %query,
            batch_size = self.batch_size,
            transport = %self.transport.kind(),
            url = %self.transport.url(),
            "starting load run"
        );

        loop {
            let index = batches_completed + 1;
            let batch = self
                .run_batch(query)
                .instrument(tracing::info_span!("batch", index));

            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(total = self.stats.total(), "load run cancelled");
                    return RunReport {
                        halt: HaltReason::Cancelled,
                        batches_completed,
                        total_requests: self.stats.total(),
                        failed_requests: 0,
                        elapsed: started.elapsed(),
                    };
                }
                results = batch => results,
            };

            let failures = results.iter().filter(|ok| !**ok).count();
            let snapshot = self.stats.snapshot();
            self.notify(BatchSummary {
                index,
                size: results.len(),
                failures,
                stats: snapshot,
            });

            if failures > 0 {
                tracing::error!(
                    batch = index,
                    failures,
                    total = snapshot.total,
                    "error encountered after {} requests, stopping",
                    snapshot.total
                );
                return RunReport {
                    halt: HaltReason::Failed,
                    batches_completed,
                    total_requests: snapshot.total,
                    failed_requests: failures,
                    elapsed: started.elapsed(),
                };
            }

            batches_completed = index;
            tracing::info!(
                batch = index,
                active = snapshot.active,
                total = snapshot.total,
                "batch completed"
            );
        }
    }

    /// Launch one batch and wait for every operation in it.
    async fn run_batch(&self, query: &QueryRequest) -> Vec<bool> {
        let transport = self.transport.as_ref();
        let ops = (0..self.batch_size).map(|i| send_query(transport, &self.stats, query, i == 0));
        future::join_all(ops).await
    }

    fn notify(&self, summary: BatchSummary) {
        if let Some(tx) = &self.progress {
            // Receiver gone just means nobody is watching any more.
            let _ = tx.send(summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::TransportKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Succeeds on every call except the `fail_at`-th (1-based).
    struct ScriptedTransport {
        calls: AtomicU64,
        fail_at: Option<u64>,
    }

    impl ScriptedTransport {
        fn new(fail_at: Option<u64>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicU64::new(0), fail_at })
        }
    }

    #[async_trait]
    impl QueryTransport for ScriptedTransport {
        async fn send_query(&self, _req: &QueryRequest) -> Result<String, TransportError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            if Some(n) == self.fail_at {
                Err(TransportError::Status { status: 500, body: "internal".into() })
            } else {
                Ok(r#"{"ok":true}"#.into())
            }
        }
        fn url(&self) -> &str {
            "mock://scripted"
        }
        fn kind(&self) -> TransportKind {
            TransportKind::Post
        }
    }

    /// Never answers.
    struct HangingTransport;

    #[async_trait]
    impl QueryTransport for HangingTransport {
        async fn send_query(&self, _req: &QueryRequest) -> Result<String, TransportError> {
            futures::future::pending().await
        }
        fn url(&self) -> &str {
            "mock://hanging"
        }
        fn kind(&self) -> TransportKind {
            TransportKind::Get
        }
    }

    fn query() -> QueryRequest {
        QueryRequest::new("game_config.get_all")
    }

    #[test]
    fn zero_batch_size_rejected() {
        let res = BatchRunner::new(ScriptedTransport::new(None), 0);
        assert!(matches!(res, Err(LoadError::Config(_))));
    }

    #[tokio::test]
    async fn send_query_maps_outcome_and_releases_counter() {
        let stats = RunStats::new();
        let transport = ScriptedTransport::new(Some(2));

        assert!(send_query(transport.as_ref(), &stats, &query(), true).await);
        assert!(!send_query(transport.as_ref(), &stats, &query(), false).await);
        assert_eq!(stats.snapshot(), StatsSnapshot { active: 0, total: 2 });
    }

    #[tokio::test]
    async fn halts_on_failed_batch() {
        // batch size 10, 7th request of the 3rd batch fails
        let transport = ScriptedTransport::new(Some(27));
        let runner = BatchRunner::new(transport.clone(), 10).unwrap();

        let report = runner.run(&query(), CancellationToken::new()).await;

        assert_eq!(report.halt, HaltReason::Failed);
        assert_eq!(report.batches_completed, 2);
        assert_eq!(report.failed_requests, 1);
        assert_eq!(report.total_requests, 2 * 10 + 10);
        // no batch launched after the failing one
        assert_eq!(transport.calls.load(Ordering::SeqCst), 30);
        assert_eq!(runner.stats().active(), 0);
    }

    #[tokio::test]
    async fn failure_in_first_batch_stops_immediately() {
        let transport = ScriptedTransport::new(Some(1));
        let runner = BatchRunner::new(transport.clone(), 5).unwrap();

        let report = runner.run(&query(), CancellationToken::new()).await;

        assert_eq!(report.halt, HaltReason::Failed);
        assert_eq!(report.batches_completed, 0);
        assert_eq!(report.total_requests, 5);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn successful_batches_relaunch_full_size() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = BatchRunner::new(ScriptedTransport::new(None), 5)
            .unwrap()
            .with_progress(tx);
        let cancel = CancellationToken::new();

        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(summary) = rx.recv().await {
                    seen.push(summary);
                    if seen.len() == 3 {
                        cancel.cancel();
                        break;
                    }
                }
                seen
            })
        };

        let report = runner.run(&query(), cancel).await;
        let seen = watcher.await.unwrap();

        assert_eq!(report.halt, HaltReason::Cancelled);
        assert!(report.batches_completed >= 3);
        for (i, summary) in seen.iter().enumerate() {
            assert_eq!(summary.index, i as u64 + 1);
            assert_eq!(summary.size, 5);
            assert!(summary.succeeded());
            assert_eq!(summary.stats.active, 0);
            assert_eq!(summary.stats.total, (i as u64 + 1) * 5);
        }
        assert_eq!(runner.stats().active(), 0);
    }

    #[tokio::test]
    async fn cancel_mid_batch_releases_in_flight() {
        let runner = Arc::new(BatchRunner::new(Arc::new(HangingTransport), 4).unwrap());
        let cancel = CancellationToken::new();

        let task = {
            let runner = runner.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { runner.run(&query(), cancel).await })
        };

        while runner.stats().active() < 4 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cancel.cancel();
        let report = task.await.unwrap();

        assert_eq!(report.halt, HaltReason::Cancelled);
        assert_eq!(report.batches_completed, 0);
        assert_eq!(report.total_requests, 4);
        assert_eq!(runner.stats().active(), 0);
    }

    #[test]
    fn requests_per_sec_handles_zero_elapsed() {
        let report = RunReport {
            halt: HaltReason::Failed,
            batches_completed: 0,
            total_requests: 10,
            failed_requests: 1,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.requests_per_sec(), 0.0);
    }
}
