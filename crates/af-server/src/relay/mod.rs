//! Same-origin verification relay.
//!
//! DigiLocker redirects (or posts) to the webhook once the user has decided.
//! The webhook fetches the e-Aadhaar, stores a status record for the user,
//! and the polling client picks it up from the status endpoint exactly once.

mod error;
mod fetch_details;
mod params;
mod status;
mod webhook;

use std::sync::Arc;

use af_core::ports::{DigiLockerPort, VerificationStorePort};
use axum::routing::get;
use axum::Router;

pub use error::RelayError;

pub const STATUS_PATH: &str = "/api/aadhaar-verification-status";
pub const WEBHOOK_PATH: &str = "/api/verify-aadhaar-webhook";
pub const FETCH_DETAILS_PATH: &str = "/api/fetch-aadhaar-details";

#[derive(Clone)]
pub struct RelayState {
    pub store: Arc<dyn VerificationStorePort>,
    pub digilocker: Arc<dyn DigiLockerPort>,
}

impl RelayState {
    pub fn new(store: Arc<dyn VerificationStorePort>, digilocker: Arc<dyn DigiLockerPort>) -> Self {
        Self { store, digilocker }
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(
            STATUS_PATH,
            get(status::take_status).post(status::store_status),
        )
        .route(
            WEBHOOK_PATH,
            get(webhook::callback_get).post(webhook::callback_post),
        )
        .route(
            &format!("{WEBHOOK_PATH}/{{user_id}}"),
            get(webhook::callback_get_for_user).post(webhook::callback_post_for_user),
        )
        .route(FETCH_DETAILS_PATH, get(fetch_details::fetch_aadhaar_details))
        .with_state(state)
}
