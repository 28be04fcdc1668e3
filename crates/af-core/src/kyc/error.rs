use thiserror::Error;

use super::{DocumentKind, KycStep};

/// KYC failures. `Display` is the message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KycError {
    #[error("Step {attempted} is locked until step {current} is verified")]
    StepLocked { current: KycStep, attempted: KycStep },

    #[error("Please enter a valid 10-character PAN number")]
    InvalidPan,

    #[error("PAN name did not match. Please verify PAN number.")]
    PanNameNotMatched,

    #[error("Name mismatch: Name on PAN does not match registered user name.")]
    PanNameMismatch,

    #[error("Failed to fetch PAN details. Please try again.")]
    PanLookupFailed,

    #[error("Please upload {0} document (PDF/JPG/PNG)")]
    DocumentMissing(DocumentKind),

    #[error("{0} document must be less than 5MB")]
    DocumentTooLarge(DocumentKind),

    #[error("Only PDF, JPG or PNG {0} documents allowed")]
    UnsupportedDocumentType(DocumentKind),

    #[error("Please upload {0} document first")]
    ProofNotUploaded(DocumentKind),

    #[error("Failed to upload {0} document. Please try again.")]
    UploadFailed(DocumentKind),

    #[error("User ID not found for document upload.")]
    MissingUserId,

    #[error("Please enter EMD amount")]
    EmdAmountMissing,

    #[error("Failed to initiate DigiLocker verification. Please try again.")]
    DigiLockerUnavailable,

    #[error("Aadhaar verification is not in progress")]
    NotAwaitingAadhaar,

    #[error("Aadhaar verification failed: Name mismatch. The name on your Aadhaar does not match your registered name.")]
    AadhaarNameMismatch,

    #[error("Aadhaar verification failed")]
    AadhaarVerificationFailed(Option<String>),

    #[error("Aadhaar verification timed out. Please try again.")]
    AadhaarTimedOut,
}
