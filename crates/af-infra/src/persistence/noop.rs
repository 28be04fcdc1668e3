use af_core::ports::StatePersistencePort;
use async_trait::async_trait;
use serde_json::Value;

/// Keeps nothing; used when no state directory is configured.
pub struct NoopStatePersistence;

#[async_trait]
impl StatePersistencePort for NoopStatePersistence {
    async fn load(&self, _key: &str) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _value: &Value) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
