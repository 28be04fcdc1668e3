use std::sync::Arc;

use af_core::listings::FiltersData;
use af_core::ports::{BackendApiPort, ClockPort};
use tracing::{debug, info_span, warn, Instrument};

use super::ListingsError;
use crate::store::AppStore;
use crate::usecases::now;

const FILTERS_FAILED: &str = "Failed to fetch filters";

/// Loads the filter option lists (regions, cities, sellers, ...).
pub struct FetchFiltersData {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
    clock: Arc<dyn ClockPort>,
}

impl FetchFiltersData {
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        store: Arc<AppStore>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
        }
    }

    pub async fn execute(&self) -> Result<FiltersData, ListingsError> {
        let span = info_span!("usecase.fetch_filters_data.execute");

        async {
            self.store
                .update_filters(|f| {
                    f.loading = true;
                    f.error = None;
                })
                .await;

            match self.backend.fetch_filters_data().await {
                Ok(body) => {
                    let data = FiltersData::normalize(&body);
                    let at = now(self.clock.as_ref());
                    debug!(cities = data.cities.len(), sellers = data.sellers.len(), "Filters loaded");
                    self.store
                        .update_filters(|f| {
                            f.data = Some(data.clone());
                            f.loading = false;
                            f.last_fetched = Some(at);
                        })
                        .await;
                    Ok(data)
                }
                Err(err) => {
                    warn!(error = %err, "Filters request failed");
                    let message = err.user_message(FILTERS_FAILED);
                    self.store
                        .update_filters(|f| {
                            f.loading = false;
                            f.error = Some(message.clone());
                        })
                        .await;
                    Err(ListingsError::Failed(message))
                }
            }
        }
        .instrument(span)
        .await
    }
}
