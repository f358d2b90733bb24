//! Load run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::LoadError;
use crate::transport::TransportKind;

/// Query issued when none is configured.
pub const DEFAULT_QUERY: &str = "game_config.get_all";

/// Operations launched per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Per-request timeout in seconds; `0` leaves the client's default in place.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything a load run needs. Serde-compatible so it can be embedded in
/// other configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Node base URL, e.g. "https://node.example.com/"
    pub base_url: String,
    /// Query name sent as `type`
    #[serde(default = "default_query")]
    pub query: String,
    /// Operations launched together per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Cap on simultaneously open requests (None = uncapped)
    #[serde(default)]
    pub concurrency: Option<usize>,
    /// GET with query string, or POST with JSON body
    #[serde(default)]
    pub transport: TransportKind,
    /// Per-request timeout in seconds (0 = client default)
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_query() -> String {
    DEFAULT_QUERY.into()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl LoadConfig {
    /// Defaults for everything but the base URL.
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            query: default_query(),
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: None,
            transport: TransportKind::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.base_url.trim().is_empty() {
            return Err(LoadError::Config("base URL must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LoadError::Config(format!(
                "base URL '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.query.trim().is_empty() {
            return Err(LoadError::Config("query name must not be empty".into()));
        }
        if self.batch_size == 0 {
            return Err(LoadError::Config("batch size must be at least 1".into()));
        }
        match self.concurrency {
            Some(0) => {
                return Err(LoadError::Config("concurrency cap must be at least 1".into()));
            }
            Some(n) if n > Semaphore::MAX_PERMITS => {
                return Err(LoadError::Config(format!(
                    "concurrency cap {n} exceeds the maximum of {}",
                    Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: LoadConfig =
            serde_json::from_str(r#"{"base_url":"https://node.example.com/"}"#).unwrap();
        assert_eq!(cfg, LoadConfig::for_url("https://node.example.com/"));
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn transport_and_cap_from_json() {
        let cfg: LoadConfig = serde_json::from_str(
            r#"{"base_url":"http://localhost:7740","transport":"post","concurrency":20,"request_timeout_secs":0}"#,
        )
        .unwrap();
        assert_eq!(cfg.transport, TransportKind::Post);
        assert_eq!(cfg.concurrency, Some(20));
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = LoadConfig::for_url("https://node.example.com");
        cfg.batch_size = 0;
        assert!(matches!(cfg.validate(), Err(LoadError::Config(_))));

        let mut cfg = LoadConfig::for_url("https://node.example.com");
        cfg.concurrency = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = LoadConfig::for_url("https://node.example.com");
        cfg.concurrency = Some(usize::MAX);
        assert!(matches!(cfg.validate(), Err(LoadError::Config(_))));

        let mut cfg = LoadConfig::for_url("https://node.example.com");
        cfg.concurrency = Some(Semaphore::MAX_PERMITS);
        assert!(cfg.validate().is_ok());

        let mut cfg = LoadConfig::for_url("https://node.example.com");
        cfg.query = "  ".into();
        assert!(cfg.validate().is_err());

        assert!(LoadConfig::for_url("").validate().is_err());
        assert!(LoadConfig::for_url("node.example.com").validate().is_err());
    }
}
