//! Auction lot domain.

mod item;
mod stage;

pub use item::{AuctionItem, AuctionMappingError, BidStatus};
pub use stage::{AuctionStage, AuctionStatus, StageAction};
