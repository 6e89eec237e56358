//! Redis model registry
//!
//! Each model is stored as a JSON document under its own key, and the set
//! of known ids is kept in an index set so listing does not need `KEYS`.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{unknown_model, validate, CreateModelInput, Credential, ModelRecord, ModelRegistry};
use crate::error::{AppError, AppResult};

/// Stored form of a model. Only this type ever serializes the secret.
#[derive(Debug, Serialize, Deserialize)]
struct StoredModel {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    endpoint: String,
    #[serde(default)]
    api_key: String,
}

impl StoredModel {
    fn into_parts(self) -> (ModelRecord, Credential) {
        (
            ModelRecord {
                id: self.id,
                name: self.name,
                description: self.description,
                endpoint: self.endpoint,
            },
            Credential::new(self.api_key),
        )
    }
}

impl From<CreateModelInput> for StoredModel {
    fn from(input: CreateModelInput) -> Self {
        Self {
            id: input.id,
            name: input.name,
            description: input.description,
            endpoint: input.endpoint,
            api_key: input.api_key,
        }
    }
}

/// Redis-backed registry
pub struct RedisRegistry {
    conn: redis::aio::ConnectionManager,
}

impl RedisRegistry {
    /// Create a registry on top of an existing connection manager
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }

    fn decode(key: &str, raw: &str) -> AppResult<StoredModel> {
        serde_json::from_str(raw).map_err(|e| {
            error!(key = %key, error = %e, "Corrupt model record in registry");
            AppError::Internal(anyhow::anyhow!("corrupt model record {}: {}", key, e))
        })
    }
}

#[async_trait]
impl ModelRegistry for RedisRegistry {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn resolve(&self, id: &str) -> AppResult<(ModelRecord, Credential)> {
        let key = keys::model(id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;

        match raw {
            Some(raw) => Ok(Self::decode(&key, &raw)?.into_parts()),
            None => {
                debug!(model = %id, "Model not present in registry");
                Err(unknown_model())
            }
        }
    }

    async fn create(&self, input: CreateModelInput) -> AppResult<ModelRecord> {
        validate(&input)?;

        let record = ModelRecord::from(&input);
        let key = keys::model(&record.id);
        let serialized = serde_json::to_string(&StoredModel::from(input))
            .map_err(|e| AppError::Internal(e.into()))?;

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(&key, serialized)
            .ignore()
            .sadd(keys::INDEX, &record.id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!(model = %record.id, "Model stored in registry");
        Ok(record)
    }

    async fn list(&self) -> AppResult<Vec<ModelRecord>> {
        let mut conn = self.conn.clone();
        let mut ids: Vec<String> = conn.smembers(keys::INDEX).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort();

        let model_keys: Vec<String> = ids.iter().map(|id| keys::model(id)).collect();
        let raws: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&model_keys)
            .query_async(&mut conn)
            .await?;

        let mut records = Vec::with_capacity(raws.len());
        for (key, raw) in model_keys.iter().zip(raws) {
            // An id left in the index without its document is skipped
            if let Some(raw) = raw {
                records.push(Self::decode(key, &raw)?.into_parts().0);
            }
        }
        Ok(records)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;
        Ok(())
    }
}

/// Registry key layout
pub mod keys {
    /// Set holding every registered model id
    pub const INDEX: &str = "modelgate:models";

    /// Key of a single model document
    pub fn model(id: &str) -> String {
        format!("modelgate:model:{}", id)
    }
}
