//! OTP login, registration-aware.

use std::sync::Arc;

use af_core::ports::{ApiError, BackendApiPort};
use af_core::session::{validate_otp, validate_phone, AuthError, LoginOutcome};
use af_core::Session;
use tracing::{info, info_span, warn, Instrument};

use crate::store::AppStore;

const SEND_OTP_FAILED: &str = "Failed to send OTP";
const LOGIN_FAILED: &str = "Login failed";

/// Requests an OTP for a mobile number.
pub struct SendOtp {
    backend: Arc<dyn BackendApiPort>,
}

impl SendOtp {
    pub fn new(backend: Arc<dyn BackendApiPort>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, phone: &str) -> Result<(), AuthError> {
        let span = info_span!("usecase.send_otp.execute");

        async {
            let phone = validate_phone(phone)?;
            self.backend.send_otp(phone).await.map_err(|err| {
                warn!(error = %err, "Failed to send OTP");
                AuthError::SendOtpFailed(err.user_message(SEND_OTP_FAILED))
            })?;
            info!("OTP sent");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

/// Verifies the OTP and opens a session.
///
/// A brand-new account yields [`LoginOutcome::NewUser`]: the session holds
/// the token but no profile, and the caller routes into registration.
pub struct VerifyOtp {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
}

impl VerifyOtp {
    pub fn new(backend: Arc<dyn BackendApiPort>, store: Arc<AppStore>) -> Self {
        Self { backend, store }
    }

    pub async fn execute(&self, phone: &str, otp: &str) -> Result<LoginOutcome, AuthError> {
        let span = info_span!("usecase.verify_otp.execute");

        async {
            let phone = validate_phone(phone)?;
            let otp = validate_otp(otp)?;

            self.store.begin_login().await;

            let login = match self.backend.login(phone, otp).await {
                Ok(body) => Session::from_login_response(&body, phone),
                Err(ApiError::Rejected(message)) if !message.trim().is_empty() => {
                    Err(AuthError::LoginFailed(message))
                }
                Err(err) => {
                    warn!(error = %err, "Login request failed");
                    Err(AuthError::LoginFailed(LOGIN_FAILED.to_string()))
                }
            };

            match login {
                Ok((session, outcome)) => {
                    info!(user_id = %session.user_id, ?outcome, "OTP verified");
                    self.store.complete_login(session).await;
                    Ok(outcome)
                }
                Err(err) => {
                    self.store.fail_login(err.to_string()).await;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

pub struct Logout {
    store: Arc<AppStore>,
}

impl Logout {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self) {
        let span = info_span!("usecase.logout.execute");

        async {
            self.store.clear_session().await;
            info!("Logged out");
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{memory_store, MockBackend};
    use serde_json::json;

    #[tokio::test]
    async fn invalid_phone_never_reaches_backend() {
        let backend = MockBackend::new();
        let uc = SendOtp::new(Arc::new(backend));
        assert_eq!(uc.execute("12345").await, Err(AuthError::InvalidPhone(10)));
    }

    #[tokio::test]
    async fn send_otp_surfaces_server_message() {
        let mut backend = MockBackend::new();
        backend
            .expect_send_otp()
            .returning(|_| Err(ApiError::Rejected("Too many attempts".into())));
        let uc = SendOtp::new(Arc::new(backend));
        assert_eq!(
            uc.execute("9999999999").await.unwrap_err().to_string(),
            "Too many attempts"
        );
    }

    #[tokio::test]
    async fn returning_user_populates_session() {
        let mut backend = MockBackend::new();
        backend
            .expect_login()
            .withf(|phone, otp| phone == "9999999999" && otp == "123456")
            .returning(|_, _| {
                Ok(json!({
                    "success": true,
                    "result": {
                        "access_token": { "access_token": "tok-9" },
                        "user": { "id": 11, "name": "Asha Rao", "email": "asha@example.com" },
                        "new_user": false
                    }
                }))
            });
        let store = memory_store();
        let uc = VerifyOtp::new(Arc::new(backend), store.clone());

        let outcome = uc.execute("9999999999", "123456").await.unwrap();

        assert_eq!(outcome, LoginOutcome::ReturningUser);
        let state = store.session().await;
        let session = state.session.unwrap();
        assert_eq!(session.name, "Asha Rao");
        assert_eq!(session.email, "asha@example.com");
        assert_eq!(session.access_token, "tok-9");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failed_login_records_error() {
        let mut backend = MockBackend::new();
        backend
            .expect_login()
            .returning(|_, _| Err(ApiError::Transport("connection refused".into())));
        let store = memory_store();
        let uc = VerifyOtp::new(Arc::new(backend), store.clone());

        assert!(uc.execute("9999999999", "123456").await.is_err());

        let state = store.session().await;
        assert!(state.session.is_none());
        assert_eq!(state.error.as_deref(), Some("Login failed"));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let mut backend = MockBackend::new();
        backend.expect_login().returning(|_, _| {
            Ok(json!({
                "success": true,
                "result": { "access_token": { "access_token": "t" }, "user": { "id": 1 } }
            }))
        });
        let store = memory_store();
        VerifyOtp::new(Arc::new(backend), store.clone())
            .execute("9999999999", "123456")
            .await
            .unwrap();

        Logout::new(store.clone()).execute().await;

        assert!(!store.session().await.is_authenticated());
    }
}
