use std::collections::HashMap;

use af_core::ports::VerificationStorePort;
use af_core::UserId;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

/// Pending status records held by the relay until the polling client takes
/// them. Process-local; records do not survive a restart.
#[derive(Default)]
pub struct InMemoryVerificationStore {
    records: Mutex<HashMap<UserId, Value>>,
}

impl InMemoryVerificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl VerificationStorePort for InMemoryVerificationStore {
    async fn put(&self, user_id: &UserId, record: Value) {
        let replaced = self
            .records
            .lock()
            .await
            .insert(user_id.clone(), record)
            .is_some();
        debug!(user_id = %user_id, replaced, "Stored verification record");
    }

    async fn take(&self, user_id: &UserId) -> Option<Value> {
        self.records.lock().await.remove(user_id)
    }
}
