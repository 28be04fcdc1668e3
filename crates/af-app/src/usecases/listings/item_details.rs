use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use af_core::config::ListingsConfig;
use af_core::ports::BackendApiPort;
use af_core::{AuctionItem, ItemId};
use chrono::FixedOffset;
use tracing::{debug, info_span, warn, Instrument};

use super::ListingsError;
use crate::store::AppStore;

const DETAILS_FAILED: &str = "Failed to fetch auction details";

/// Cancellation flag owned by a detail view. Once canceled, late responses
/// for that view are dropped instead of applied.
#[derive(Debug, Clone, Default)]
pub struct ViewGuard(Arc<AtomicBool>);

impl ViewGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct GetItemDetails {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
    offset: FixedOffset,
}

impl GetItemDetails {
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        store: Arc<AppStore>,
        config: &ListingsConfig,
    ) -> Self {
        Self {
            backend,
            store,
            offset: config.timezone_offset(),
        }
    }

    /// Fetches one item. Cached listing copies are refreshed with the result
    /// unless `guard` was canceled while the request was in flight.
    pub async fn execute(
        &self,
        item_id: &ItemId,
        guard: &ViewGuard,
    ) -> Result<AuctionItem, ListingsError> {
        let span = info_span!("usecase.get_item_details.execute", item_id = %item_id);

        async {
            let body = self.backend.fetch_item_details(item_id).await.map_err(|err| {
                warn!(error = %err, "Item details request failed");
                ListingsError::Failed(err.user_message(DETAILS_FAILED))
            })?;

            if guard.is_canceled() {
                debug!("View closed before details arrived");
                return Err(ListingsError::Canceled);
            }

            let item = AuctionItem::from_details_response(&body, self.offset)
                .map_err(|err| {
                    warn!(error = %err, "Unreadable item details");
                    ListingsError::Failed(DETAILS_FAILED.to_string())
                })?
                .ok_or_else(|| ListingsError::NotFound(item_id.clone()))?;

            self.store.update_listings(|l| l.replace_item(&item)).await;
            Ok(item)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{memory_store, MockBackend};
    use af_core::listings::ListingsPage;
    use chrono::Utc;
    use serde_json::json;

    fn usecase(backend: MockBackend, store: Arc<AppStore>) -> GetItemDetails {
        GetItemDetails::new(Arc::new(backend), store, &ListingsConfig::default())
    }

    #[tokio::test]
    async fn refreshes_cached_copy() {
        let store = memory_store();
        let page = ListingsPage::normalize(
            &json!([{ "id": 4, "winner_amount": 100 }]),
            1,
            FixedOffset::east_opt(0).unwrap(),
        );
        store.update_listings(|l| l.live.complete(page, Utc::now())).await;

        let mut backend = MockBackend::new();
        backend
            .expect_fetch_item_details()
            .withf(|id| id.as_str() == "4")
            .returning(|_| Ok(json!({ "result": [{ "id": 4, "winner_amount": 250 }] })));

        let item = usecase(backend, store.clone())
            .execute(&ItemId::from("4"), &ViewGuard::new())
            .await
            .unwrap();

        assert_eq!(item.winner_amount, 250);
        assert_eq!(store.listings().await.live.data[0].winner_amount, 250);
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_item_details()
            .returning(|_| Ok(json!({ "result": [] })));

        let err = usecase(backend, memory_store())
            .execute(&ItemId::from("9"), &ViewGuard::new())
            .await
            .unwrap_err();

        assert_eq!(err, ListingsError::NotFound(ItemId::from("9")));
    }

    #[tokio::test]
    async fn canceled_view_drops_response() {
        let guard = ViewGuard::new();
        let view = guard.clone();
        let mut backend = MockBackend::new();
        backend.expect_fetch_item_details().returning(move |_| {
            view.cancel();
            Ok(json!({ "result": [{ "id": 4, "winner_amount": 999 }] }))
        });
        let store = memory_store();

        let err = usecase(backend, store.clone())
            .execute(&ItemId::from("4"), &guard)
            .await
            .unwrap_err();

        assert_eq!(err, ListingsError::Canceled);
        assert!(store.listings().await.find(&ItemId::from("4")).is_none());
    }
}
