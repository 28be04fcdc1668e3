use serde_json::Value;

use super::{AuthError, Session};
use crate::ids::UserId;
use crate::json;

pub const PHONE_LENGTH: usize = 10;
pub const OTP_LENGTH: usize = 6;

/// What the caller should do after a successful OTP verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    ReturningUser,
    /// Route into registration rather than treating this as a completed login.
    NewUser,
}

pub fn validate_phone(phone: &str) -> Result<&str, AuthError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AuthError::MissingPhone);
    }
    if phone.len() != PHONE_LENGTH || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidPhone(PHONE_LENGTH));
    }
    Ok(phone)
}

pub fn validate_otp(otp: &str) -> Result<&str, AuthError> {
    let otp = otp.trim();
    if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidOtp(OTP_LENGTH));
    }
    Ok(otp)
}

impl Session {
    /// Builds a session from an `auth/login` response body
    /// `{success, message, result: {access_token: {access_token}, user, new_user}}`.
    pub fn from_login_response(body: &Value, phone: &str) -> Result<(Self, LoginOutcome), AuthError> {
        let failed = |fallback: &str| {
            AuthError::LoginFailed(
                json::string(body, &["message"]).unwrap_or_else(|| fallback.to_string()),
            )
        };

        if !json::flag(body, &["success"]) {
            return Err(failed("Login failed"));
        }
        let result = body.get("result").ok_or_else(|| failed("Login failed"))?;

        let access_token = result
            .get("access_token")
            .and_then(|t| match t {
                Value::String(s) => Some(s.clone()),
                other => json::string(other, &["access_token"]),
            })
            .unwrap_or_default();
        let user = result.get("user");
        let user_id = user
            .and_then(|u| json::string(u, &["id"]))
            .map(UserId::from)
            .unwrap_or_else(|| UserId::from(""));

        if json::flag(result, &["new_user"]) {
            let session = Self {
                access_token,
                user_id,
                phone: phone.to_string(),
                name: String::new(),
                email: String::new(),
                new_user: true,
            };
            return Ok((session, LoginOutcome::NewUser));
        }

        if access_token.is_empty() {
            return Err(AuthError::LoginFailed(
                json::string(result, &["message"]).unwrap_or_else(|| "Login failed".to_string()),
            ));
        }

        let session = Self {
            access_token,
            user_id,
            phone: phone.to_string(),
            name: user.and_then(|u| json::string(u, &["name"])).unwrap_or_default(),
            email: user.and_then(|u| json::string(u, &["email"])).unwrap_or_default(),
            new_user: false,
        };
        Ok((session, LoginOutcome::ReturningUser))
    }
}
