use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please enter mobile number")]
    MissingPhone,

    #[error("Please enter valid {0}-digit mobile number")]
    InvalidPhone(usize),

    #[error("Please enter the complete {0}-digit OTP")]
    InvalidOtp(usize),

    #[error("{0}")]
    LoginFailed(String),

    #[error("{0}")]
    SendOtpFailed(String),

    #[error("Please login first")]
    NotLoggedIn,
}
