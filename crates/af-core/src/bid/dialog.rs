use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BidError, Countdown};
use crate::auction::AuctionItem;
use crate::ids::{AuctionId, ItemId, UserId};

pub const DEFAULT_BID_INCREMENT: u64 = 10_000;

/// Body of `POST auctions/bid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRequest {
    pub item_id: ItemId,
    pub auction_id: Option<AuctionId>,
    pub bid_amount: u64,
}

/// Highest bid as shown in the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBid {
    pub bidder: String,
    pub amount: u64,
    pub is_user: bool,
}

/// State of one open bid dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidDialogState {
    pub item_id: ItemId,
    pub auction_id: Option<AuctionId>,
    pub current_bid: u64,
    pub bid_amount: u64,
    pub increment: u64,
    pub reserve_price: u64,
    pub current_winner_id: Option<UserId>,
    pub end_at: Option<DateTime<Utc>>,
    pub countdown: Countdown,
    pub is_expired: bool,
    pub editing: bool,
}

impl BidDialogState {
    /// Seeds the dialog from the item. A lot without an end time is treated
    /// as already closed.
    pub fn open(item: &AuctionItem, default_increment: u64, now: DateTime<Utc>) -> Self {
        let mut state = Self {
            item_id: item.item_id.clone(),
            auction_id: item.auction_id.clone(),
            current_bid: 0,
            bid_amount: 0,
            increment: 0,
            reserve_price: 0,
            current_winner_id: None,
            end_at: item.end_at,
            countdown: Countdown::default(),
            is_expired: false,
            editing: false,
        };
        state.reseed(item, default_increment);
        state.tick(now);
        state
    }

    /// Picks up new bid fields from the parent's copy of the item. Expiry is
    /// never lifted once reached.
    pub fn refresh_from(&mut self, item: &AuctionItem, default_increment: u64) {
        self.reseed(item, default_increment);
        if !self.is_expired {
            self.end_at = item.end_at;
        }
    }

    fn reseed(&mut self, item: &AuctionItem, default_increment: u64) {
        self.increment = item.increment_amount.unwrap_or(default_increment).max(1);
        self.current_bid = item.winner_amount;
        self.reserve_price = item.reserve_price;
        self.current_winner_id = item.winner_id.clone();
        self.bid_amount = self
            .current_bid
            .max(self.reserve_price)
            .saturating_add(self.increment);
    }

    /// Lowest amount the stepper will go down to.
    pub fn min_bid(&self) -> u64 {
        self.current_bid.saturating_add(self.increment)
    }

    pub fn increase(&mut self) {
        self.bid_amount = self.bid_amount.saturating_add(self.increment);
    }

    pub fn decrease(&mut self) {
        self.bid_amount = self
            .bid_amount
            .saturating_sub(self.increment)
            .max(self.min_bid());
    }

    pub fn toggle_edit(&mut self) {
        self.editing = !self.editing;
    }

    /// Direct entry; checked only at submission like stepped amounts.
    pub fn set_manual_amount(&mut self, amount: u64) {
        self.bid_amount = amount;
    }

    /// Recomputes the countdown. Returns `true` only on the tick where the
    /// dialog becomes expired.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_expired {
            return false;
        }
        match self.end_at.and_then(|end| Countdown::until(end, now)) {
            Some(countdown) => {
                self.countdown = countdown;
                false
            }
            None => {
                self.countdown = Countdown::default();
                self.is_expired = true;
                true
            }
        }
    }

    pub fn validate_submission(&self) -> Result<u64, BidError> {
        if self.is_expired {
            return Err(BidError::Expired);
        }
        if self.bid_amount <= self.current_bid {
            return Err(BidError::BidTooLow {
                amount: self.bid_amount,
                current_bid: self.current_bid,
            });
        }
        Ok(self.bid_amount)
    }

    pub fn request(&self, amount: u64) -> BidRequest {
        BidRequest {
            item_id: self.item_id.clone(),
            auction_id: self.auction_id.clone(),
            bid_amount: amount,
        }
    }

    /// Optimistic update after the backend accepted `amount`. Returns the
    /// next minimum bid.
    pub fn apply_success(&mut self, amount: u64, user_id: &UserId) -> u64 {
        self.current_bid = amount;
        self.current_winner_id = Some(user_id.clone());
        self.bid_amount = amount.saturating_add(self.increment);
        self.bid_amount
    }

    pub fn top_bid(&self, viewer: Option<&UserId>) -> Option<TopBid> {
        let winner = self.current_winner_id.as_ref().filter(|id| !id.is_unset())?;
        let is_user = viewer.is_some_and(|v| v == winner);
        Some(TopBid {
            bidder: if is_user {
                "You".to_string()
            } else {
                format!("Bidder #{winner}")
            },
            amount: self.current_bid,
            is_user,
        })
    }
}
