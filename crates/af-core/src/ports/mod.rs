//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the adapters in
//! `af-infra` / `af-server`. Use cases only ever hold `Arc<dyn ...Port>`.

mod access_token;
mod backend;
mod clock;
pub mod errors;
mod kyc_dialog;
mod kyc_services;
mod persistence;
mod verification;

pub use access_token::AccessTokenPort;
pub use backend::BackendApiPort;
pub use clock::ClockPort;
pub use errors::{ApiError, VerificationWaitError};
pub use kyc_dialog::KycDialogPort;
pub use kyc_services::{DigiLockerPort, PanDetails, PanLookupPort};
pub use persistence::StatePersistencePort;
pub use verification::{VerificationResultSource, VerificationStorePort};
