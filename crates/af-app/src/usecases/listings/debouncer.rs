use std::sync::Arc;
use std::time::Duration;

use af_core::config::ListingsConfig;
use af_core::listings::ListingFilters;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, warn, Instrument};

use super::FetchListings;

/// Coalesces rapid filter edits into one page-1 fetch.
///
/// Every submission restarts the window; only the last filters within the
/// window are fetched.
pub struct FilterDebouncer {
    fetch: Arc<FetchListings>,
    delay: Duration,
    records: u32,
    pending: Mutex<Option<AbortHandle>>,
}

impl FilterDebouncer {
    pub fn new(fetch: Arc<FetchListings>, config: &ListingsConfig) -> Self {
        Self {
            fetch,
            delay: Duration::from_millis(config.filter_debounce_ms),
            records: config.records_per_page,
            pending: Mutex::new(None),
        }
    }

    pub async fn submit(&self, filters: ListingFilters) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
            debug!("Superseded pending filter fetch");
        }

        let fetch = self.fetch.clone();
        let delay = self.delay;
        let records = self.records;
        let span = tracing::info_span!("usecase.filter_debouncer.fire");
        let handle = tokio::spawn(
            async move {
                tokio::time::sleep(delay).await;
                if let Err(err) = fetch.filtered(filters, 1, records).await {
                    warn!(error = %err, "Debounced listings fetch failed");
                }
            }
            .instrument(span),
        );
        *pending = Some(handle.abort_handle());
    }

    pub async fn cancel(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}

impl Drop for FilterDebouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
