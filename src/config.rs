//! Configuration management for Modelgate
//!
//! Configuration is loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

/// Default size of a relayed body chunk (32 KiB)
pub const DEFAULT_RELAY_CHUNK_BYTES: usize = 32 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Redis connection URL for the model registry.
    /// When unset, models are kept in process memory.
    pub redis_url: Option<String>,

    /// Largest inbound request body accepted for relaying
    pub max_body_bytes: usize,
    /// Upper bound on the size of each body chunk written back to the caller
    pub relay_chunk_bytes: usize,

    /// Idle pooled connections kept per upstream host
    pub pool_max_idle_per_host: usize,
    /// Timeout for establishing an upstream connection (not for the whole call)
    pub connect_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let relay_chunk_bytes: usize = var(
            "MODELGATE_RELAY_CHUNK_BYTES",
            &DEFAULT_RELAY_CHUNK_BYTES.to_string(),
        )
        .parse()
        .context("Invalid MODELGATE_RELAY_CHUNK_BYTES")?;
        if relay_chunk_bytes == 0 {
            bail!("MODELGATE_RELAY_CHUNK_BYTES must be greater than zero");
        }

        Ok(Self {
            host: var("MODELGATE_HOST", "0.0.0.0"),
            port: var("MODELGATE_PORT", "8080")
                .parse()
                .context("Invalid MODELGATE_PORT")?,

            redis_url: lookup("REDIS_URL").filter(|v| !v.trim().is_empty()),

            max_body_bytes: var("MODELGATE_MAX_BODY_BYTES", "10485760")
                .parse()
                .context("Invalid MODELGATE_MAX_BODY_BYTES")?,
            relay_chunk_bytes,

            pool_max_idle_per_host: var("MODELGATE_POOL_MAX_IDLE_PER_HOST", "100")
                .parse()
                .context("Invalid MODELGATE_POOL_MAX_IDLE_PER_HOST")?,
            connect_timeout_seconds: var("MODELGATE_CONNECT_TIMEOUT_SECONDS", "10")
                .parse()
                .context("Invalid MODELGATE_CONNECT_TIMEOUT_SECONDS")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redis_url: None,
            max_body_bytes: 10 * 1024 * 1024,
            relay_chunk_bytes: DEFAULT_RELAY_CHUNK_BYTES,
            pool_max_idle_per_host: 100,
            connect_timeout_seconds: 10,
        }
    }
}
