//! Policies applied around a transport.
//!
//! ```text
//! Operation → [ConcurrencyLimit] → [Transport]
//! ```
//!
//! There is no retry or backoff layer: a load run stops at the
//! first failed batch.

pub mod concurrency;

pub use concurrency::{ConcurrencyLimit, LimitedTransport};
