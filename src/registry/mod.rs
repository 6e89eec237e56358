//! Model registry
//!
//! The registry maps a model identifier to the upstream endpoint serving it
//! and the credential used to authenticate against that endpoint. The relay
//! only depends on the [`ModelRegistry`] trait; storage backends live in the
//! submodules.

pub mod in_memory;
pub mod redis;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub use self::in_memory::InMemoryRegistry;
pub use self::redis::RedisRegistry;

/// A routable model as exposed by the management API.
///
/// The credential is deliberately not part of this type; it is returned
/// separately from [`ModelRegistry::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModelRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base URL of the upstream service
    pub endpoint: String,
}

/// Input accepted when registering a model.
///
/// Missing fields deserialize as empty and are reported by [`validate`].
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateModelInput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub endpoint: String,
    /// Secret sent upstream as a bearer token when the caller supplies none
    pub api_key: String,
}

/// Opaque upstream secret.
///
/// Never serialized and redacted in `Debug`/`Display` so it cannot leak
/// through logs or responses.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building the outbound `Authorization` header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the secret is empty after trimming whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Keyed model storage consumed by the relay and the management API.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Backend name for logging and health output
    fn name(&self) -> &'static str;

    /// Look up a model by exact identifier.
    ///
    /// Fails with [`AppError::NotFound`] when no record matches.
    async fn resolve(&self, id: &str) -> AppResult<(ModelRecord, Credential)>;

    /// Validate and store a model, replacing any record with the same id.
    async fn create(&self, input: CreateModelInput) -> AppResult<ModelRecord>;

    /// All models ordered by id
    async fn list(&self) -> AppResult<Vec<ModelRecord>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// The error returned for unknown ids. Carries no registry contents.
pub(crate) fn unknown_model() -> AppError {
    AppError::NotFound("unknown model id".to_string())
}

/// Validate creation input: id, name and endpoint are required and the
/// endpoint must be an absolute http(s) URL.
pub fn validate(input: &CreateModelInput) -> AppResult<()> {
    let mut missing = Vec::new();
    if input.id.trim().is_empty() {
        missing.push("id");
    }
    if input.name.trim().is_empty() {
        missing.push("name");
    }
    if input.endpoint.trim().is_empty() {
        missing.push("endpoint");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "{} required",
            missing.join(", ")
        )));
    }

    let url = reqwest::Url::parse(&input.endpoint)
        .map_err(|e| AppError::Validation(format!("endpoint is not a valid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(
            "endpoint must use http or https".to_string(),
        ));
    }

    Ok(())
}

impl From<&CreateModelInput> for ModelRecord {
    fn from(input: &CreateModelInput) -> Self {
        Self {
            id: input.id.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            endpoint: input.endpoint.clone(),
        }
    }
}
