use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /api/aadhaar-verification-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub verified: bool,
    pub aadhaar_data: Option<Value>,
}

impl StatusResponse {
    pub fn found(record: Value) -> Self {
        Self {
            verified: true,
            aadhaar_data: Some(record),
        }
    }

    pub fn empty() -> Self {
        Self {
            verified: false,
            aadhaar_data: None,
        }
    }
}

/// Body of `POST /api/aadhaar-verification-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub aadhaar_data: Option<Value>,
    #[serde(default)]
    pub is_failed: bool,
}

impl StoreRequest {
    /// The record to keep; failures are tagged with `authorizationFailed`.
    pub fn into_record(self) -> Option<Value> {
        let mut record = self.aadhaar_data.filter(|v| !v.is_null())?;
        if self.is_failed {
            if let Value::Object(map) = &mut record {
                map.insert("authorizationFailed".to_string(), Value::Bool(true));
            }
        }
        Some(record)
    }
}
