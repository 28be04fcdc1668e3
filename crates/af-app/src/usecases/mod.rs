//! Use cases. Each holds its ports as `Arc<dyn ...>` and runs its work in an
//! `info_span!("usecase.<name>.<op>")`.

pub mod auth;
pub mod bid;
pub mod enquiry;
pub mod kyc;
pub mod listings;
pub mod watchlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{Logout, SendOtp, VerifyOtp};
pub use bid::{BidDialog, BidPlaced};
pub use enquiry::{CompleteRegistration, SubmitEnquiry};
pub use kyc::KycWorkflow;
pub use listings::{FetchFiltersData, FetchListings, FilterDebouncer, GetItemDetails, ListingsError, ViewGuard};
pub use watchlist::ToggleWatchlist;

use af_core::ports::ClockPort;
use chrono::{DateTime, Utc};

pub(crate) fn now(clock: &dyn ClockPort) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(clock.now_ms()).unwrap_or_default()
}
