use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::json;

/// Why a verification step did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NameMismatch,
    VerificationFailed,
    AuthorizationFailed,
    TimedOut,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameMismatch => "name_mismatch",
            Self::VerificationFailed => "verification_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity data shared through DigiLocker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AadhaarIdentity {
    pub name: String,
    /// Masked as returned by DigiLocker (`xxxxxxxx1234`).
    pub aadhaar_number: String,
    pub dob: Option<String>,
    pub gender: Option<String>,
    /// Free-form: DigiLocker returns either a string or a structured object.
    #[serde(default)]
    pub address: Value,
}

impl AadhaarIdentity {
    /// Reads any of the shapes in circulation: raw DigiLocker data
    /// (`userName`, `maskedAadhaarNo`, `DOB`) or a relay record
    /// (`name_on_aadhar`, `aadhar_no`, `dob`).
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: json::string(value, &["userName", "name", "name_on_aadhar"]).unwrap_or_default(),
            aadhaar_number: json::string(value, &["maskedAadhaarNo", "aadhar_no", "aadhaar_no"])
                .unwrap_or_default(),
            dob: json::string(value, &["DOB", "dob"]),
            gender: json::string(value, &["gender"]),
            address: json::field(value, &["address"]).cloned().unwrap_or(Value::Null),
        }
    }

    /// Record shape stored by the relay for the polling client.
    pub fn to_status_record(&self) -> Value {
        json!({
            "name_on_aadhar": self.name,
            "aadhar_no": self.aadhaar_number,
            "dob": self.dob,
            "gender": self.gender,
            "address": self.address,
        })
    }
}

/// Terminal result of an Aadhaar authorization, whichever transport
/// delivered it.
#[derive(Debug, Clone, PartialEq)]
pub enum AadhaarOutcome {
    Verified(AadhaarIdentity),
    Failed(FailureReason, Option<String>),
}

impl AadhaarOutcome {
    /// Interprets the `payload` of an `aadhaarVerification` window message.
    ///
    /// `None` when the payload reports success but carries no data; such
    /// messages are ignored.
    pub fn from_message_payload(payload: &Value) -> Option<Self> {
        if !json::flag(payload, &["success"]) {
            let reason = if json::flag(payload, &["authorizationFailed"]) {
                FailureReason::AuthorizationFailed
            } else {
                FailureReason::VerificationFailed
            };
            return Some(Self::Failed(reason, json::string(payload, &["error", "message"])));
        }

        let response = json::field(payload, &["data"])?;
        let data = json::field(response, &["data"]).unwrap_or(response);
        Some(Self::Verified(AadhaarIdentity::from_value(data)))
    }

    /// Interprets an `aadhaarData` record served by the status relay.
    pub fn from_status_record(record: &Value) -> Self {
        if json::flag(record, &["authorizationFailed"]) {
            return Self::Failed(
                FailureReason::AuthorizationFailed,
                json::string(record, &["error"]),
            );
        }
        if let Some(error) = json::string(record, &["error"]) {
            return Self::Failed(FailureReason::VerificationFailed, Some(error));
        }
        Self::Verified(AadhaarIdentity::from_value(record))
    }

    /// Relay record for this outcome plus whether it is a failure.
    pub fn to_status_record(&self) -> (Value, bool) {
        match self {
            Self::Verified(identity) => (identity.to_status_record(), false),
            Self::Failed(reason, message) => (
                json!({
                    "name_on_aadhar": null,
                    "aadhar_no": null,
                    "dob": null,
                    "gender": null,
                    "address": null,
                    "error": message.clone().unwrap_or_else(|| reason.as_str().to_string()),
                }),
                true,
            ),
        }
    }
}
