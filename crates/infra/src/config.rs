//! Configuration loader
//!
//! Loads engine configuration with an environment-first strategy:
//! 1. Environment variables, when `TAPER_DB_PATH` is set
//! 2. A TOML file (`./taper.toml`, then `./config.toml`)
//! 3. Built-in defaults
//!
//! ## Environment Variables
//! - `TAPER_DB_PATH`: Database file path (presence selects env loading)
//! - `TAPER_DB_POOL_SIZE`: Connection pool size
//! - `TAPER_RETRY_BACKOFF_MS`: Backoff before the materializer's single
//!   transient-storage retry

use std::path::{Path, PathBuf};

use taper_domain::{DatabaseConfig, EngineConfig, MaterializerConfig, Result, TaperError};
use tracing::{debug, info};

/// Load configuration with automatic fallback strategy.
pub fn load() -> Result<EngineConfig> {
    if let Some(config) = load_from_env()? {
        info!("configuration loaded from environment variables");
        return Ok(config);
    }

    if let Some(config) = load_from_file(None)? {
        return Ok(config);
    }

    debug!("no configuration source found; using defaults");
    Ok(EngineConfig::default())
}

/// Load configuration from environment variables.
///
/// Returns `Ok(None)` when `TAPER_DB_PATH` is not set; other variables fall
/// back to their defaults individually.
///
/// # Errors
/// Returns `TaperError::Config` when a variable is present but malformed.
pub fn load_from_env() -> Result<Option<EngineConfig>> {
    let Ok(path) = std::env::var("TAPER_DB_PATH") else {
        return Ok(None);
    };

    let defaults = EngineConfig::default();

    let pool_size = match std::env::var("TAPER_DB_POOL_SIZE") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|e| TaperError::Config(format!("Invalid pool size: {e}")))?,
        Err(_) => defaults.database.pool_size,
    };

    let retry_backoff_ms = match std::env::var("TAPER_RETRY_BACKOFF_MS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| TaperError::Config(format!("Invalid retry backoff: {e}")))?,
        Err(_) => defaults.materializer.retry_backoff_ms,
    };

    Ok(Some(EngineConfig {
        database: DatabaseConfig { path, pool_size },
        materializer: MaterializerConfig { retry_backoff_ms },
    }))
}

/// Load configuration from a TOML file.
///
/// With no explicit path, probes `./taper.toml` then `./config.toml`.
/// Returns `Ok(None)` when no candidate file exists.
///
/// # Errors
/// Returns `TaperError::Config` when a file exists but cannot be read or
/// parsed.
pub fn load_from_file(path: Option<&Path>) -> Result<Option<EngineConfig>> {
    let candidates: Vec<PathBuf> = match path {
        Some(explicit) => vec![explicit.to_path_buf()],
        None => vec![PathBuf::from("taper.toml"), PathBuf::from("config.toml")],
    };

    for candidate in candidates {
        if !candidate.exists() {
            continue;
        }

        let raw = std::fs::read_to_string(&candidate).map_err(|e| {
            TaperError::Config(format!("Failed to read {}: {e}", candidate.display()))
        })?;
        let config = toml::from_str(&raw).map_err(|e| {
            TaperError::Config(format!("Failed to parse {}: {e}", candidate.display()))
        })?;

        info!(path = %candidate.display(), "configuration loaded from file");
        return Ok(Some(config));
    }

    Ok(None)
}
