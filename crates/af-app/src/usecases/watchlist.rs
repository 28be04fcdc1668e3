use std::sync::Arc;

use af_core::ItemId;
use tracing::{debug, info_span, Instrument};

use crate::store::AppStore;

pub struct ToggleWatchlist {
    store: Arc<AppStore>,
}

impl ToggleWatchlist {
    pub fn new(store: Arc<AppStore>) -> Self {
        Self { store }
    }

    /// Returns whether the item is watched afterwards.
    pub async fn execute(&self, item_id: &ItemId) -> bool {
        let span = info_span!("usecase.toggle_watchlist.execute", item_id = %item_id);

        async {
            let watched = self
                .store
                .update_activity(|activity| activity.toggle_watchlist(item_id))
                .await;
            debug!(watched, "Watchlist toggled");
            watched
        }
        .instrument(span)
        .await
    }
}
