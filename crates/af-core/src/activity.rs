//! Per-user lists kept on the client: watchlist, lots bid on, lots verified.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserActivity {
    pub watchlist: BTreeSet<ItemId>,
    pub your_auctions: BTreeSet<ItemId>,
    pub verified_items: BTreeSet<ItemId>,
    pub bids: BTreeMap<ItemId, u64>,
}

impl UserActivity {
    /// Returns whether the item is now watched.
    pub fn toggle_watchlist(&mut self, item_id: &ItemId) -> bool {
        if self.watchlist.remove(item_id) {
            false
        } else {
            self.watchlist.insert(item_id.clone());
            true
        }
    }

    pub fn is_watched(&self, item_id: &ItemId) -> bool {
        self.watchlist.contains(item_id)
    }

    pub fn mark_verified(&mut self, item_id: &ItemId) {
        self.verified_items.insert(item_id.clone());
    }

    pub fn is_verified(&self, item_id: &ItemId) -> bool {
        self.verified_items.contains(item_id)
    }

    pub fn record_bid(&mut self, item_id: &ItemId, amount: u64) {
        self.bids.insert(item_id.clone(), amount);
        self.your_auctions.insert(item_id.clone());
    }

    pub fn last_bid(&self, item_id: &ItemId) -> Option<u64> {
        self.bids.get(item_id).copied()
    }
}
