//! Listings, filters and item details.

mod debouncer;
mod fetch_listings;
mod filters_data;
mod item_details;

use af_core::ItemId;
use thiserror::Error;

pub use debouncer::FilterDebouncer;
pub use fetch_listings::FetchListings;
pub use filters_data::FetchFiltersData;
pub use item_details::{GetItemDetails, ViewGuard};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListingsError {
    #[error("{0}")]
    Failed(String),

    #[error("Auction item {0} not found")]
    NotFound(ItemId),

    #[error("request canceled")]
    Canceled,
}
