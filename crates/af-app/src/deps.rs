//! # Application Dependencies
//!
//! Parameter grouping for use case construction. Not a builder: every
//! dependency is required and nothing is defaulted here.

use std::sync::Arc;

use af_core::config::AppConfig;
use af_core::ports::*;

use crate::store::AppStore;
use crate::usecases::*;

pub struct AppDeps {
    // Remote collaborators
    pub backend: Arc<dyn BackendApiPort>,
    pub pan_lookup: Arc<dyn PanLookupPort>,
    pub digilocker: Arc<dyn DigiLockerPort>,

    // Aadhaar result transport (polling or message channel)
    pub verification_results: Arc<dyn VerificationResultSource>,

    // Presentation callbacks
    pub kyc_dialog: Arc<dyn KycDialogPort>,

    // System
    pub clock: Arc<dyn ClockPort>,
    pub store: Arc<AppStore>,
    pub config: AppConfig,
}

/// Builds use cases from one [`AppDeps`].
pub struct AppUseCases {
    deps: AppDeps,
    kyc: Arc<KycWorkflow>,
}

impl AppUseCases {
    pub fn new(deps: AppDeps) -> Self {
        let kyc = KycWorkflow::new(
            deps.store.clone(),
            deps.pan_lookup.clone(),
            deps.backend.clone(),
            deps.digilocker.clone(),
            deps.verification_results.clone(),
            deps.kyc_dialog.clone(),
            &deps.config,
        );
        Self { deps, kyc }
    }

    pub fn store(&self) -> &Arc<AppStore> {
        &self.deps.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.deps.config
    }

    pub fn send_otp(&self) -> SendOtp {
        SendOtp::new(self.deps.backend.clone())
    }

    pub fn verify_otp(&self) -> VerifyOtp {
        VerifyOtp::new(self.deps.backend.clone(), self.deps.store.clone())
    }

    pub fn logout(&self) -> Logout {
        Logout::new(self.deps.store.clone())
    }

    pub fn fetch_listings(&self) -> Arc<FetchListings> {
        Arc::new(FetchListings::new(
            self.deps.backend.clone(),
            self.deps.store.clone(),
            self.deps.clock.clone(),
            &self.deps.config.listings,
        ))
    }

    pub fn filter_debouncer(&self) -> FilterDebouncer {
        FilterDebouncer::new(self.fetch_listings(), &self.deps.config.listings)
    }

    pub fn fetch_filters_data(&self) -> FetchFiltersData {
        FetchFiltersData::new(
            self.deps.backend.clone(),
            self.deps.store.clone(),
            self.deps.clock.clone(),
        )
    }

    pub fn get_item_details(&self) -> GetItemDetails {
        GetItemDetails::new(
            self.deps.backend.clone(),
            self.deps.store.clone(),
            &self.deps.config.listings,
        )
    }

    pub fn submit_enquiry(&self) -> SubmitEnquiry {
        SubmitEnquiry::new(self.deps.backend.clone(), self.deps.store.clone())
    }

    pub fn complete_registration(&self) -> CompleteRegistration {
        CompleteRegistration::new(
            self.deps.backend.clone(),
            self.deps.store.clone(),
            self.deps.clock.clone(),
        )
    }

    pub fn toggle_watchlist(&self) -> ToggleWatchlist {
        ToggleWatchlist::new(self.deps.store.clone())
    }

    /// The KYC workflow is shared so that listener and timer tasks survive
    /// between calls.
    pub fn kyc(&self) -> Arc<KycWorkflow> {
        self.kyc.clone()
    }

    pub fn bid_dialog(&self) -> BidDialog {
        BidDialog::new(
            self.deps.backend.clone(),
            self.deps.store.clone(),
            self.deps.clock.clone(),
            &self.deps.config,
        )
    }
}
