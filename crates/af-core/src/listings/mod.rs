//! Listings: paging, filter queries and the cached listing slices.

mod filters;
mod filters_data;
mod page;
mod state;

pub use filters::{ListingFilters, ListingsQuery};
pub use filters_data::{FilterOption, FiltersData, FiltersState, PriceRange};
pub use page::ListingsPage;
pub use state::{FilteredListings, ListingSlice, ListingsState, DEFAULT_RECORDS_PER_PAGE};
