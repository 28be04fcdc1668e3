use async_trait::async_trait;
use serde_json::Value;

/// Key/value storage for client state that must survive restarts.
#[async_trait]
pub trait StatePersistencePort: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn save(&self, key: &str, value: &Value) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
