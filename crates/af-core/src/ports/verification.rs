use async_trait::async_trait;
use serde_json::Value;

use super::VerificationWaitError;
use crate::ids::UserId;
use crate::verification::AadhaarOutcome;

/// Delivers the result of a user's Aadhaar authorization exactly once.
///
/// Implemented by the polling transport and by the window-message channel;
/// the KYC workflow does not know which one is wired.
#[async_trait]
pub trait VerificationResultSource: Send + Sync {
    async fn await_result(&self, user_id: &UserId) -> Result<AadhaarOutcome, VerificationWaitError>;
}

/// Pending verification records, keyed by user. A record is handed out at
/// most once.
#[async_trait]
pub trait VerificationStorePort: Send + Sync {
    /// Overwrites any record already pending for the user.
    async fn put(&self, user_id: &UserId, record: Value);

    async fn take(&self, user_id: &UserId) -> Option<Value>;
}
