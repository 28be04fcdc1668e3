//! Verification result transports and the relay's pending-record store.
//!
//! [`PollingSource`] asks the relay for a stored status record until one
//! appears; [`MessageChannelSource`] waits for the `aadhaarVerification`
//! window message posted by the DigiLocker popup. Both implement
//! `VerificationResultSource`, so the KYC workflow is transport agnostic.

mod memory_store;
mod message_channel;
mod polling;

pub use memory_store::InMemoryVerificationStore;
pub use message_channel::{message_channel, MessageChannelSource, WindowMessageSender};
pub use polling::PollingSource;
