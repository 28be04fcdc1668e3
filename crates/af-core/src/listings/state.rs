use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ListingsPage;
use crate::auction::AuctionItem;
use crate::ids::{ItemId, UserId};

pub const DEFAULT_RECORDS_PER_PAGE: u32 = 21;

/// A simple fetched list (live or upcoming).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSlice {
    pub data: Vec<AuctionItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
}

impl ListingSlice {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn complete(&mut self, page: ListingsPage, now: DateTime<Utc>) {
        self.data = page.data;
        self.loading = false;
        self.last_fetched = Some(now);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

/// Paged window for the filtered search view. Each page replaces `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredListings {
    pub data: Vec<AuctionItem>,
    pub page: u32,
    pub records: u32,
    pub total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
}

impl Default for FilteredListings {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            page: 1,
            records: DEFAULT_RECORDS_PER_PAGE,
            total: 0,
            has_more: true,
            loading: false,
            error: None,
            last_fetched: None,
        }
    }
}

impl FilteredListings {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// `requested_records` is the page size asked for; the count returned on
    /// a short last page must not shrink it.
    pub fn complete(&mut self, page: ListingsPage, requested_records: u32, now: DateTime<Utc>) {
        let page_size = if requested_records > 0 {
            requested_records
        } else if page.records > 0 {
            page.records
        } else {
            self.records
        };

        self.has_more = page.has_more(page_size);
        self.page = page.page;
        self.total = page.total;
        self.records = page_size;
        self.data = page.data;
        self.loading = false;
        self.last_fetched = Some(now);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Next page to request for infinite scroll, if any.
    pub fn next_page(&self) -> Option<u32> {
        (self.has_more && !self.loading).then_some(self.page + 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingsState {
    pub live: ListingSlice,
    pub upcoming: ListingSlice,
    #[serde(default)]
    pub filtered: FilteredListings,
}

impl ListingsState {
    /// Patches every cached copy of the item after an accepted bid.
    /// Returns whether any copy was found.
    pub fn apply_bid(&mut self, item_id: &ItemId, amount: u64, user_id: &UserId) -> bool {
        let mut found = false;
        for item in self
            .live
            .data
            .iter_mut()
            .chain(self.upcoming.data.iter_mut())
            .chain(self.filtered.data.iter_mut())
            .filter(|item| &item.item_id == item_id || &item.id == item_id)
        {
            item.apply_bid(amount, user_id);
            found = true;
        }
        found
    }

    /// Swaps cached copies for a freshly fetched record.
    pub fn replace_item(&mut self, fresh: &AuctionItem) -> bool {
        let mut found = false;
        for item in self
            .live
            .data
            .iter_mut()
            .chain(self.upcoming.data.iter_mut())
            .chain(self.filtered.data.iter_mut())
            .filter(|item| item.item_id == fresh.item_id || item.id == fresh.id)
        {
            *item = fresh.clone();
            found = true;
        }
        found
    }

    pub fn find(&self, item_id: &ItemId) -> Option<&AuctionItem> {
        self.live
            .data
            .iter()
            .chain(self.upcoming.data.iter())
            .chain(self.filtered.data.iter())
            .find(|item| &item.item_id == item_id || &item.id == item_id)
    }
}
