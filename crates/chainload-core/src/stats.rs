//! Run-scoped request counters.
//!
//! Every query operation touches these from its own future, so both fields
//! are atomics. They are telemetry only and never used to order work.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for one load run. Never reset while the run is alive.
#[derive(Debug, Default)]
pub struct RunStats {
    active: AtomicU64,
    total: AtomicU64,
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Requests currently in flight.
    pub active: u64,
    /// Requests issued since the run started.
    pub total: u64,
}

impl RunStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn active(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            active: self.active(),
            total: self.total(),
        }
    }

    /// Mark a request as started. The returned guard ends it on drop.
    pub fn begin(self: &Arc<Self>) -> InFlight {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
        InFlight {
            stats: Arc::clone(self),
        }
    }
}

/// Accounts for one in-flight request.
///
/// Dropping it decrements `active` exactly once, whether the request
/// finished, failed, panicked or its future was dropped mid-flight.
#[derive(Debug)]
#[must_use = "dropping the guard immediately ends the request"]
pub struct InFlight {
    stats: Arc<RunStats>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.stats.active.fetch_sub(1, Ordering::Relaxed);
    }
}
