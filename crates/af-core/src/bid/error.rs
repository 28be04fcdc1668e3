use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BidError {
    #[error("Auction has ended. Bidding is closed.")]
    Expired,

    #[error("Invalid bid amount: your bid must be higher than the current bid.")]
    BidTooLow { amount: u64, current_bid: u64 },

    #[error("Please login to place a bid")]
    NotLoggedIn,

    #[error("{0}")]
    Rejected(String),

    #[error("Failed to place bid. Please try again later.")]
    Failed,

    #[error("Bid dialog is closed")]
    Closed,
}
