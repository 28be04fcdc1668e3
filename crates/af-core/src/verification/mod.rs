//! Aadhaar verification results and the two ways they reach the client:
//! window messages from the DigiLocker popup, and relay status records.

mod message;
mod outcome;
mod record;

pub use message::{VerificationMessage, WindowMessage, VERIFICATION_MESSAGE_TYPE};
pub use outcome::{AadhaarIdentity, AadhaarOutcome, FailureReason};
pub use record::{StatusResponse, StoreRequest};
