//! Enquiries and new-user profile completion.

use std::sync::Arc;

use af_core::enquiry::{EnquiryError, EnquiryForm, EnquiryRequest, UpdateUserRequest};
use af_core::ports::{BackendApiPort, ClockPort};
use af_core::ItemId;
use tracing::{info, info_span, warn, Instrument};

use crate::store::AppStore;

const ENQUIRY_FAILED: &str = "Failed to submit enquiry";
const PROFILE_FAILED: &str = "Failed to update profile";

pub struct SubmitEnquiry {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
}

impl SubmitEnquiry {
    pub fn new(backend: Arc<dyn BackendApiPort>, store: Arc<AppStore>) -> Self {
        Self { backend, store }
    }

    pub async fn execute(&self, item_id: &ItemId, form: &EnquiryForm) -> Result<(), EnquiryError> {
        let span = info_span!("usecase.submit_enquiry.execute", item_id = %item_id);

        async {
            form.validate()?;
            let session = self
                .store
                .session()
                .await
                .session
                .ok_or(EnquiryError::NotLoggedIn)?;

            let request = EnquiryRequest::new(item_id, form, &session.phone, session.new_user);
            self.backend.submit_enquiry(&request).await.map_err(|err| {
                warn!(error = %err, "Enquiry submission failed");
                EnquiryError::Failed(err.user_message(ENQUIRY_FAILED))
            })?;

            self.store
                .update_prefill(|prefill| {
                    prefill.full_name = request.name.clone();
                    prefill.email = request.email.clone();
                })
                .await;
            info!("Enquiry submitted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

/// Fills in name and email for an account created by OTP login.
pub struct CompleteRegistration {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
    clock: Arc<dyn ClockPort>,
}

impl CompleteRegistration {
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        store: Arc<AppStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
        }
    }

    pub async fn execute(&self, form: &EnquiryForm) -> Result<(), EnquiryError> {
        let span = info_span!("usecase.complete_registration.execute");

        async {
            form.validate()?;
            let session = self
                .store
                .session()
                .await
                .session
                .ok_or(EnquiryError::NotLoggedIn)?;

            let request =
                UpdateUserRequest::new(&session.user_id, form, &session.phone, self.clock.now_ms());
            self.backend.update_user(&request).await.map_err(|err| {
                warn!(error = %err, "Profile update failed");
                EnquiryError::Failed(err.user_message(PROFILE_FAILED))
            })?;

            self.store
                .complete_registration(&request.name, &request.email)
                .await;
            self.store
                .update_prefill(|prefill| {
                    prefill.full_name = request.name.clone();
                    prefill.email = request.email.clone();
                })
                .await;
            info!(user_id = %session.user_id, "Registration completed");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
