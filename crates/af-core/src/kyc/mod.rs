//! Per-item KYC verification: PAN, then EMD, then Aadhaar via DigiLocker.

mod document;
mod error;
mod registry;
mod state;
mod state_machine;

pub use document::{DocumentFile, DocumentKind, ALLOWED_DOCUMENT_TYPES, MAX_DOCUMENT_BYTES};
pub use error::KycError;
pub use registry::KycRegistry;
pub use state::{AadhaarPhase, KycFormData, KycItemState, KycStep, PAN_LENGTH};
pub use state_machine::{names_match, KycAction, KycEvent, KycStateMachine, KycTransition};
