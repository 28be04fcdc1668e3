use thiserror::Error;

/// Failure talking to the backend or a KYC service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    /// The service answered but reported failure (`success: false`).
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Message suitable for showing to the user, falling back to `default`
    /// for failures whose detail is not meant for users.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            Self::Rejected(message) if !message.trim().is_empty() => message.clone(),
            _ => default.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationWaitError {
    #[error("no verification result after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("verification channel closed")]
    Closed,
}
