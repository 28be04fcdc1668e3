//! Per-item KYC workflow: PAN, EMD, then Aadhaar through DigiLocker.

mod tasks;
mod workflow;

pub use workflow::KycWorkflow;
