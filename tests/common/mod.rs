//! Common test utilities for Modelgate
//!
//! Shared harness for building the application around an in-memory registry.
//! No Redis is required.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use modelgate::{
    registry::CreateModelInput, routes, AppState, Config, InMemoryRegistry, ModelRegistry,
};

/// Test configuration constants
pub mod constants {
    /// Model id used by most relay tests
    pub const TEST_MODEL_ID: &str = "gpt-x";
    /// Credential registered for the test model
    pub const TEST_API_KEY: &str = "k1";
}

/// Application under test plus direct access to its registry
pub struct TestApp {
    pub state: Arc<AppState>,
    pub registry: Arc<InMemoryRegistry>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let registry = Arc::new(InMemoryRegistry::new());
        let state = AppState::with_registry(config, registry.clone())
            .expect("Failed to build application state");

        Self {
            state: Arc::new(state),
            registry,
        }
    }

    /// Register a model directly in the registry
    pub async fn seed_model(&self, id: &str, endpoint: &str, api_key: &str) {
        self.registry
            .create(CreateModelInput {
                id: id.to_string(),
                name: format!("{} (test)", id),
                description: String::new(),
                endpoint: endpoint.to_string(),
                api_key: api_key.to_string(),
            })
            .await
            .expect("Failed to seed model");
    }

    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to create test server")
    }
}

/// Serve the application on an ephemeral local port and return its base URL
pub async fn spawn_app(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server error");
    });

    format!("http://{}", addr)
}
