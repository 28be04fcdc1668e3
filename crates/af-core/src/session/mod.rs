//! Authenticated session and OTP login rules.

mod error;
mod login;

pub use error::AuthError;
pub use login::{validate_otp, validate_phone, LoginOutcome, OTP_LENGTH, PHONE_LENGTH};

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A logged-in buyer.
///
/// `new_user` marks a first-time OTP verification: the profile is empty
/// until registration completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: UserId,
    pub phone: String,
    pub name: String,
    pub email: String,
    pub new_user: bool,
}

impl Session {
    pub fn has_profile(&self) -> bool {
        !self.new_user && !self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session: Option<Session>,
    #[serde(skip)]
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
}

impl SessionState {
    pub fn user_id(&self) -> Option<&UserId> {
        self.session
            .as_ref()
            .map(|s| &s.user_id)
            .filter(|id| !id.is_unset())
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}
