use serde::{Deserialize, Serialize};

use crate::auction::AuctionStatus;

/// Filter panel selections. Empty strings and `"all"` mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub main_category_id: String,
    pub category_id: String,
    pub seller_id: String,
    pub city_id: String,
    pub status: String,
    pub search_query: String,
    pub sort_by: String,
}

impl ListingFilters {
    fn is_active(value: &str) -> bool {
        let value = value.trim();
        !value.is_empty() && !value.eq_ignore_ascii_case("all")
    }

    /// `item_status` code selected through the status filter, if any.
    pub fn item_status(&self) -> Option<u8> {
        if !Self::is_active(&self.status) {
            return None;
        }
        AuctionStatus::parse(&self.status).item_status_code()
    }

    /// Query parameters contributed by the filters. `item_status` is left to
    /// [`ListingsQuery`] so an explicit status always wins.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (key, value) in [
            ("main_category_id", &self.main_category_id),
            ("category_id", &self.category_id),
            ("seller_id", &self.seller_id),
            ("city_id", &self.city_id),
        ] {
            if Self::is_active(value) {
                pairs.push((key, value.trim().to_string()));
            }
        }
        if !self.search_query.trim().is_empty() {
            pairs.push(("search", self.search_query.trim().to_string()));
        }
        if !self.sort_by.trim().is_empty() {
            pairs.push(("sort_by", self.sort_by.trim().to_string()));
        }
        pairs
    }
}

/// A `home/1/details` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingsQuery {
    pub page: u32,
    pub records: u32,
    pub item_status: Option<u8>,
    pub filters: ListingFilters,
}

impl ListingsQuery {
    pub fn new(page: u32, records: u32) -> Self {
        Self {
            page: page.max(1),
            records,
            item_status: None,
            filters: ListingFilters::default(),
        }
    }

    pub fn with_status(mut self, status: AuctionStatus) -> Self {
        self.item_status = status.item_status_code();
        self
    }

    pub fn with_filters(mut self, filters: ListingFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(code) = self.item_status.or_else(|| self.filters.item_status()) {
            pairs.push(("item_status", code.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("records", self.records.to_string()));
        pairs.extend(self.filters.query_pairs());
        pairs
    }
}
