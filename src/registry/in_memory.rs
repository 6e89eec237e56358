//! In-memory model registry
//!
//! Process-local registry used when no Redis URL is configured and in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{unknown_model, validate, CreateModelInput, Credential, ModelRecord, ModelRegistry};
use crate::error::AppResult;

/// Stored entry: the public record plus its secret
struct Entry {
    record: ModelRecord,
    credential: Credential,
}

/// In-memory registry
///
/// Records are kept in a `BTreeMap` so listing is ordered by id. Lookups
/// take a shared read lock; only `create` takes the write lock.
#[derive(Default)]
pub struct InMemoryRegistry {
    models: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelRegistry for InMemoryRegistry {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn resolve(&self, id: &str) -> AppResult<(ModelRecord, Credential)> {
        let models = self.models.read().await;
        models
            .get(id)
            .map(|entry| (entry.record.clone(), entry.credential.clone()))
            .ok_or_else(unknown_model)
    }

    async fn create(&self, input: CreateModelInput) -> AppResult<ModelRecord> {
        validate(&input)?;

        let record = ModelRecord::from(&input);
        let entry = Entry {
            record: record.clone(),
            credential: Credential::new(input.api_key),
        };

        self.models.write().await.insert(record.id.clone(), entry);
        Ok(record)
    }

    async fn list(&self) -> AppResult<Vec<ModelRecord>> {
        let models = self.models.read().await;
        Ok(models.values().map(|entry| entry.record.clone()).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
