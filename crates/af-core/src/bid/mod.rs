//! Bid dialog rules: seeding, stepping, countdown and submission checks.

mod countdown;
mod dialog;
mod error;

pub use countdown::Countdown;
pub use dialog::{BidDialogState, BidRequest, TopBid, DEFAULT_BID_INCREMENT};
pub use error::BidError;
