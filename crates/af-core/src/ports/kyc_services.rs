use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;
use crate::verification::AadhaarIdentity;

/// Result of a PAN lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PanDetails {
    /// Name registered against the PAN, if the service returned one.
    pub name: Option<String>,
    pub raw: Value,
}

#[async_trait]
pub trait PanLookupPort: Send + Sync {
    async fn lookup(&self, pan: &str) -> Result<PanDetails, ApiError>;
}

#[async_trait]
pub trait DigiLockerPort: Send + Sync {
    /// Creates the authorization URL the user opens. DigiLocker redirects to
    /// `callback_url` once the user has decided.
    async fn create_authorization_url(&self, callback_url: &str) -> Result<String, ApiError>;

    /// Fetches the e-Aadhaar shared under `request_id`.
    async fn fetch_eaadhaar(&self, request_id: &str) -> Result<AadhaarIdentity, ApiError>;
}
