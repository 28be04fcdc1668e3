use af_core::listings::ListingsState;
use af_core::{KycRegistry, Session};
use serde::{Deserialize, Serialize};

pub const ROOT_KEY: &str = "root";
pub const ACTIVITY_KEY: &str = "activity";
pub const PREFILL_KEY: &str = "form_prefill";

/// Persisted under [`ROOT_KEY`]: session, listing caches and KYC progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSnapshot {
    pub session: Option<Session>,
    pub listings: ListingsState,
    pub kyc: KycRegistry,
}
