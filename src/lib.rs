//! Modelgate - model-aware HTTP relay
//!
//! This library provides the core functionality for the Modelgate server.
//! It reads the `model` field of chat completion requests, resolves the
//! upstream endpoint registered for that model, and streams the upstream
//! response back to the caller.

pub mod config;
pub mod docs;
pub mod error;
pub mod proxy;
pub mod registry;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;

pub use crate::config::Config;
pub use crate::proxy::ModelRelay;
pub use crate::registry::{InMemoryRegistry, ModelRegistry, RedisRegistry};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Model lookup and management backend
    pub registry: Arc<dyn ModelRegistry>,
    /// Upstream relay sharing one pooled HTTP client across requests
    pub relay: ModelRelay,
}

impl AppState {
    /// Create a new application state, choosing the registry backend from
    /// configuration
    pub async fn new(config: Config) -> Result<Self> {
        let registry: Arc<dyn ModelRegistry> = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let conn = redis::aio::ConnectionManager::new(client).await?;
                info!("Using Redis model registry");
                Arc::new(RedisRegistry::new(conn))
            }
            None => {
                info!("REDIS_URL not set, using in-memory model registry");
                Arc::new(InMemoryRegistry::new())
            }
        };

        Self::with_registry(config, registry)
    }

    /// Create application state around an existing registry
    pub fn with_registry(config: Config, registry: Arc<dyn ModelRegistry>) -> Result<Self> {
        let http_client = proxy::build_http_client(&config)?;
        let relay = ModelRelay::new(http_client, &config);

        Ok(Self {
            config,
            start_time: Instant::now(),
            registry,
            relay,
        })
    }
}
