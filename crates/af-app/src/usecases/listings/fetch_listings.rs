use std::sync::Arc;

use af_core::config::ListingsConfig;
use af_core::listings::{ListingFilters, ListingsPage, ListingsQuery};
use af_core::ports::{BackendApiPort, ClockPort};
use af_core::{AuctionItem, AuctionStatus};
use chrono::FixedOffset;
use tracing::{debug, info_span, warn, Instrument};

use super::ListingsError;
use crate::store::AppStore;
use crate::usecases::now;

const FETCH_FAILED: &str = "Failed to fetch auctions";

#[derive(Clone, Copy, Debug)]
enum Slice {
    Live,
    Upcoming,
}

/// Loads listing pages into the store.
pub struct FetchListings {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
    clock: Arc<dyn ClockPort>,
    offset: FixedOffset,
}

impl FetchListings {
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        store: Arc<AppStore>,
        clock: Arc<dyn ClockPort>,
        config: &ListingsConfig,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            offset: config.timezone_offset(),
        }
    }

    pub async fn live(&self, page: u32, records: u32) -> Result<Vec<AuctionItem>, ListingsError> {
        let span = info_span!("usecase.fetch_listings.live", page, records);
        self.fetch_slice(Slice::Live, page, records).instrument(span).await
    }

    pub async fn upcoming(
        &self,
        page: u32,
        records: u32,
    ) -> Result<Vec<AuctionItem>, ListingsError> {
        let span = info_span!("usecase.fetch_listings.upcoming", page, records);
        self.fetch_slice(Slice::Upcoming, page, records)
            .instrument(span)
            .await
    }

    async fn fetch_slice(
        &self,
        slice: Slice,
        page: u32,
        records: u32,
    ) -> Result<Vec<AuctionItem>, ListingsError> {
        let status = match slice {
            Slice::Live => AuctionStatus::Live,
            Slice::Upcoming => AuctionStatus::Upcoming,
        };
        let query = ListingsQuery::new(page, records).with_status(status);

        self.store
            .update_listings(|l| match slice {
                Slice::Live => l.live.begin(),
                Slice::Upcoming => l.upcoming.begin(),
            })
            .await;

        match self.request(&query).await {
            Ok(result) => {
                let items = result.data.clone();
                let at = now(self.clock.as_ref());
                self.store
                    .update_listings(|l| match slice {
                        Slice::Live => l.live.complete(result, at),
                        Slice::Upcoming => l.upcoming.complete(result, at),
                    })
                    .await;
                debug!(?slice, count = items.len(), "Listings loaded");
                Ok(items)
            }
            Err(err) => {
                let message = err.to_string();
                self.store
                    .update_listings(|l| match slice {
                        Slice::Live => l.live.fail(message),
                        Slice::Upcoming => l.upcoming.fail(message),
                    })
                    .await;
                Err(err)
            }
        }
    }

    /// Loads one page of the filtered search view. Each page replaces the
    /// previous window.
    pub async fn filtered(
        &self,
        filters: ListingFilters,
        page: u32,
        records: u32,
    ) -> Result<Vec<AuctionItem>, ListingsError> {
        let span = info_span!("usecase.fetch_listings.filtered", page, records);

        async {
            let query = ListingsQuery::new(page, records).with_filters(filters);
            self.store.update_listings(|l| l.filtered.begin()).await;

            match self.request(&query).await {
                Ok(result) => {
                    let items = result.data.clone();
                    let at = now(self.clock.as_ref());
                    self.store
                        .update_listings(|l| l.filtered.complete(result, records, at))
                        .await;
                    Ok(items)
                }
                Err(err) => {
                    let message = err.to_string();
                    self.store
                        .update_listings(|l| l.filtered.fail(message))
                        .await;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Requests the page after the current one. Returns `Ok(None)` when the
    /// last page is already loaded or a load is in flight.
    pub async fn load_next_page(
        &self,
        filters: ListingFilters,
    ) -> Result<Option<Vec<AuctionItem>>, ListingsError> {
        let filtered = self.store.listings().await.filtered;
        match filtered.next_page() {
            Some(page) => self.filtered(filters, page, filtered.records).await.map(Some),
            None => {
                debug!(page = filtered.page, "No further listing pages");
                Ok(None)
            }
        }
    }

    async fn request(&self, query: &ListingsQuery) -> Result<ListingsPage, ListingsError> {
        let body = self.backend.fetch_listings(query).await.map_err(|err| {
            warn!(error = %err, "Listings request failed");
            ListingsError::Failed(err.user_message(FETCH_FAILED))
        })?;
        Ok(ListingsPage::normalize(&body, query.page, self.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{memory_store, FixedClock, MockBackend};
    use af_core::config::ListingsConfig;
    use af_core::ports::ApiError;
    use serde_json::json;

    fn usecase(backend: MockBackend, store: Arc<AppStore>) -> FetchListings {
        FetchListings::new(
            Arc::new(backend),
            store,
            Arc::new(FixedClock::at(1_700_000_000_000)),
            &ListingsConfig::default(),
        )
    }

    #[tokio::test]
    async fn live_requests_status_two() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_listings()
            .withf(|q| q.item_status == Some(2) && q.page == 1 && q.records == 21)
            .returning(|_| Ok(json!({ "data": [{ "id": 1 }, { "id": 2 }], "total": 2 })));
        let store = memory_store();

        let items = usecase(backend, store.clone()).live(1, 21).await.unwrap();

        assert_eq!(items.len(), 2);
        let live = store.listings().await.live;
        assert_eq!(live.data.len(), 2);
        assert!(!live.loading);
        assert!(live.last_fetched.is_some());
    }

    #[tokio::test]
    async fn upcoming_failure_keeps_previous_items() {
        let mut backend = MockBackend::new();
        let mut calls = 0;
        backend.expect_fetch_listings().returning(move |q| {
            assert_eq!(q.item_status, Some(3));
            calls += 1;
            if calls == 1 {
                Ok(json!([{ "id": 8 }]))
            } else {
                Err(ApiError::Status { status: 502, body: String::new() })
            }
        });
        let store = memory_store();
        let uc = usecase(backend, store.clone());

        uc.upcoming(1, 21).await.unwrap();
        let err = uc.upcoming(1, 21).await.unwrap_err();

        assert_eq!(err, ListingsError::Failed("Failed to fetch auctions".into()));
        let upcoming = store.listings().await.upcoming;
        assert_eq!(upcoming.data.len(), 1);
        assert_eq!(upcoming.error.as_deref(), Some("Failed to fetch auctions"));
    }

    #[tokio::test]
    async fn next_page_only_when_more_remain() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_listings()
            .withf(|q| q.page == 1)
            .times(1)
            .returning(|_| Ok(json!({ "data": [{ "id": 1 }, { "id": 2 }], "total": 3, "page": 1 })));
        backend
            .expect_fetch_listings()
            .withf(|q| q.page == 2 && q.records == 2)
            .times(1)
            .returning(|_| Ok(json!({ "data": [{ "id": 3 }], "total": 3, "page": 2 })));
        let store = memory_store();
        let uc = usecase(backend, store.clone());

        uc.filtered(ListingFilters::default(), 1, 2).await.unwrap();
        let second = uc.load_next_page(ListingFilters::default()).await.unwrap();
        let third = uc.load_next_page(ListingFilters::default()).await.unwrap();

        assert_eq!(second.map(|items| items.len()), Some(1));
        assert!(third.is_none());
        assert!(!store.listings().await.filtered.has_more);
    }
}
