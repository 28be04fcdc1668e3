use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::AadhaarOutcome;
use crate::json;

pub const VERIFICATION_MESSAGE_TYPE: &str = "aadhaarVerification";

/// A message posted to the opener window, as seen by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMessage {
    pub origin: String,
    pub data: Value,
}

impl WindowMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

/// A validated `aadhaarVerification` message.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationMessage {
    pub outcome: AadhaarOutcome,
}

impl VerificationMessage {
    /// Messages from another origin, of another `type`, or without an
    /// actionable payload are ignored.
    pub fn parse(message: &WindowMessage, expected_origin: &str) -> Option<Self> {
        if message.origin.trim_end_matches('/') != expected_origin.trim_end_matches('/') {
            debug!(origin = %message.origin, "Ignoring message from foreign origin");
            return None;
        }
        if json::string(&message.data, &["type"]).as_deref() != Some(VERIFICATION_MESSAGE_TYPE) {
            return None;
        }
        let payload = json::field(&message.data, &["payload"])?;
        AadhaarOutcome::from_message_payload(payload).map(|outcome| Self { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verification::FailureReason;
    use serde_json::json;

    const ORIGIN: &str = "https://auctions.example.com";

    #[test]
    fn foreign_origin_is_ignored() {
        let msg = WindowMessage::new(
            "https://evil.example.com",
            json!({ "type": "aadhaarVerification", "payload": { "success": false } }),
        );
        assert!(VerificationMessage::parse(&msg, ORIGIN).is_none());
    }

    #[test]
    fn other_message_types_are_ignored() {
        let msg = WindowMessage::new(ORIGIN, json!({ "type": "resize", "payload": {} }));
        assert!(VerificationMessage::parse(&msg, ORIGIN).is_none());
    }

    #[test]
    fn valid_failure_message_parses() {
        let msg = WindowMessage::new(
            format!("{ORIGIN}/"),
            json!({ "type": "aadhaarVerification", "payload": { "success": false } }),
        );
        let parsed = VerificationMessage::parse(&msg, ORIGIN).unwrap();
        assert_eq!(
            parsed.outcome,
            AadhaarOutcome::Failed(FailureReason::VerificationFailed, None)
        );
    }
}
