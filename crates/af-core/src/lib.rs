//! # af-core
//!
//! Core domain models and business rules for the auction storefront.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! no HTTP, no filesystem, no timers. Side effects are described through the
//! traits in [`ports`] and performed by `af-infra` adapters.

pub mod activity;
pub mod auction;
pub mod bid;
pub mod config;
pub mod enquiry;
pub mod ids;
pub mod kyc;
pub mod listings;
pub mod ports;
pub mod session;
pub mod verification;

mod json;

// Re-export commonly used types at the crate root
pub use activity::UserActivity;
pub use auction::{AuctionItem, AuctionStage, AuctionStatus, BidStatus, StageAction};
pub use bid::{BidDialogState, BidError, Countdown};
pub use config::AppConfig;
pub use ids::{AuctionId, ItemId, UserId};
pub use kyc::{DocumentFile, DocumentKind, KycError, KycItemState, KycRegistry, KycStateMachine, KycStep};
pub use listings::{ListingFilters, ListingsPage, ListingsQuery};
pub use session::{LoginOutcome, Session, SessionState};
pub use verification::{AadhaarIdentity, AadhaarOutcome, FailureReason};
