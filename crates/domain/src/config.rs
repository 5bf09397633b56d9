//! Engine configuration structures
//!
//! Typed configuration consumed by the infrastructure layer. Loading (env
//! vars, TOML files) lives in `taper-infra`; the types and defaults live
//! here so core and tests can construct them directly.

use serde::{Deserialize, Serialize};

use crate::constants::MATERIALIZE_RETRY_BACKOFF_MS;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub materializer: MaterializerConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "taper.db".to_string(), pool_size: 4 }
    }
}

/// Materializer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializerConfig {
    /// Fixed backoff before the single transient-storage retry, in
    /// milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self { retry_backoff_ms: MATERIALIZE_RETRY_BACKOFF_MS }
    }
}
