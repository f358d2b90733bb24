//! chainload-core — batch load runner and shared types for chainload.
//!
//! # Overview
//!
//! chainload saturates a blockchain node's query endpoint with batches of
//! concurrent requests until one of them fails. The core crate defines:
//!
//! - [`QueryTransport`] — the async trait every query transport implements
//! - [`QueryRequest`] — the named query sent to `/query/{brid}`
//! - [`EndpointConfig`] — base URL, BRID and the derived query URL
//! - [`RunStats`] — atomic in-flight / total counters shared by a run
//! - [`BatchRunner`] — the batch loop, halting on the first failed batch
//! - [`LoadSession`] — background run with cancel-on-teardown
//! - [`policy`] module — concurrency cap

pub mod config;
pub mod endpoint;
pub mod error;
pub mod policy;
pub mod request;
pub mod runner;
pub mod session;
pub mod stats;
pub mod transport;

pub use config::LoadConfig;
pub use endpoint::EndpointConfig;
pub use error::{LoadError, ResolverError, TransportError};
pub use policy::{ConcurrencyLimit, LimitedTransport};
pub use request::QueryRequest;
pub use runner::{BatchRunner, BatchSummary, HaltReason, RunReport};
pub use session::LoadSession;
pub use stats::{RunStats, StatsSnapshot};
pub use transport::{QueryTransport, TransportKind};
