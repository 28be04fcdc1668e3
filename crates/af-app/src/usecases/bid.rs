//! Bid dialog: stepper, countdown and submission.

use std::sync::Arc;
use std::time::Duration;

use af_core::bid::{BidDialogState, BidError};
use af_core::config::AppConfig;
use af_core::ports::{ApiError, BackendApiPort, ClockPort};
use af_core::{AuctionItem, ItemId, UserId};
use chrono::FixedOffset;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::store::AppStore;
use crate::usecases::now;

const TICK: Duration = Duration::from_secs(1);

/// Reported to the caller after the backend accepted a bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidPlaced {
    pub item_id: ItemId,
    pub amount: u64,
    pub user_id: UserId,
    pub next_min_bid: u64,
}

pub type BidPlacedCallback = Arc<dyn Fn(&BidPlaced) + Send + Sync>;

/// One open bid dialog.
///
/// While open, a ticker task refreshes the countdown every second. The
/// ticker is stopped by [`BidDialog::close`] or when the dialog is dropped.
pub struct BidDialog {
    backend: Arc<dyn BackendApiPort>,
    store: Arc<AppStore>,
    clock: Arc<dyn ClockPort>,
    default_increment: u64,
    reconcile_after_bid: bool,
    offset: FixedOffset,
    state: Arc<Mutex<Option<BidDialogState>>>,
    ticker: Mutex<Option<AbortHandle>>,
    on_placed: Option<BidPlacedCallback>,
}

impl BidDialog {
    pub fn new(
        backend: Arc<dyn BackendApiPort>,
        store: Arc<AppStore>,
        clock: Arc<dyn ClockPort>,
        config: &AppConfig,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            default_increment: config.bidding.default_increment,
            reconcile_after_bid: config.bidding.reconcile_after_bid,
            offset: config.listings.timezone_offset(),
            state: Arc::new(Mutex::new(None)),
            ticker: Mutex::new(None),
            on_placed: None,
        }
    }

    pub fn on_placed(mut self, callback: impl Fn(&BidPlaced) + Send + Sync + 'static) -> Self {
        self.on_placed = Some(Arc::new(callback));
        self
    }

    pub async fn open(&self, item: &AuctionItem) -> BidDialogState {
        let span = info_span!("usecase.bid_dialog.open", item_id = %item.item_id);

        async {
            let opened =
                BidDialogState::open(item, self.default_increment, now(self.clock.as_ref()));
            *self.state.lock().await = Some(opened.clone());
            debug!(
                bid_amount = opened.bid_amount,
                expired = opened.is_expired,
                "Bid dialog opened"
            );
            if !opened.is_expired {
                self.start_ticker().await;
            }
            opened
        }
        .instrument(span)
        .await
    }

    async fn start_ticker(&self) {
        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                let mut guard = state.lock().await;
                let Some(dialog) = guard.as_mut() else {
                    break;
                };
                if dialog.tick(now(clock.as_ref())) {
                    info!(item_id = %dialog.item_id, "Auction ended, bidding closed");
                }
                if dialog.is_expired {
                    break;
                }
            }
        });

        if let Some(previous) = self.ticker.lock().await.replace(handle.abort_handle()) {
            previous.abort();
        }
    }

    pub async fn close(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.abort();
        }
        *self.state.lock().await = None;
        debug!("Bid dialog closed");
    }

    pub async fn state(&self) -> Option<BidDialogState> {
        self.state.lock().await.clone()
    }

    async fn update(
        &self,
        f: impl FnOnce(&mut BidDialogState),
    ) -> Result<BidDialogState, BidError> {
        let mut guard = self.state.lock().await;
        let dialog = guard.as_mut().ok_or(BidError::Closed)?;
        f(dialog);
        Ok(dialog.clone())
    }

    pub async fn increase(&self) -> Result<BidDialogState, BidError> {
        self.update(BidDialogState::increase).await
    }

    pub async fn decrease(&self) -> Result<BidDialogState, BidError> {
        self.update(BidDialogState::decrease).await
    }

    pub async fn toggle_edit(&self) -> Result<BidDialogState, BidError> {
        self.update(BidDialogState::toggle_edit).await
    }

    pub async fn set_manual_amount(&self, amount: u64) -> Result<BidDialogState, BidError> {
        self.update(|dialog| dialog.set_manual_amount(amount)).await
    }

    /// Picks up bid fields from the parent's newer copy of the item.
    pub async fn refresh(&self, item: &AuctionItem) -> Result<BidDialogState, BidError> {
        let increment = self.default_increment;
        self.update(|dialog| dialog.refresh_from(item, increment))
            .await
    }

    /// Places the current bid amount. Local checks run first and never reach
    /// the network; a failed request leaves the current bid as it was.
    pub async fn submit(&self) -> Result<BidPlaced, BidError> {
        let span = info_span!("usecase.bid_dialog.submit");

        async {
            let (request, increment) = {
                let guard = self.state.lock().await;
                let dialog = guard.as_ref().ok_or(BidError::Closed)?;
                let amount = dialog.validate_submission()?;
                (dialog.request(amount), dialog.increment)
            };
            let user_id = self.store.user_id().await.ok_or(BidError::NotLoggedIn)?;
            let amount = request.bid_amount;

            self.backend
                .place_bid(&user_id, &request)
                .await
                .map_err(|err| match err {
                    ApiError::Rejected(message) if !message.trim().is_empty() => {
                        info!(%message, "Bid rejected");
                        BidError::Rejected(message)
                    }
                    other => {
                        warn!(error = %other, "Bid request failed");
                        BidError::Failed
                    }
                })?;

            let next_min_bid = match self.state.lock().await.as_mut() {
                Some(dialog) => dialog.apply_success(amount, &user_id),
                None => amount.saturating_add(increment),
            };
            self.store
                .apply_bid(&request.item_id, amount, &user_id)
                .await;
            self.store
                .update_activity(|activity| activity.record_bid(&request.item_id, amount))
                .await;

            let placed = BidPlaced {
                item_id: request.item_id.clone(),
                amount,
                user_id,
                next_min_bid,
            };
            info!(item_id = %placed.item_id, amount, next_min_bid, "Bid placed");
            if let Some(callback) = &self.on_placed {
                callback(&placed);
            }

            if self.reconcile_after_bid {
                if let Err(err) = self.reconcile().await {
                    warn!(error = %err, "Post-bid reconcile failed");
                }
            }
            Ok(placed)
        }
        .instrument(span)
        .await
    }

    /// Re-reads the item from the backend and reseeds the dialog from it.
    pub async fn reconcile(&self) -> Result<BidDialogState, BidError> {
        let item_id = self
            .state
            .lock()
            .await
            .as_ref()
            .map(|dialog| dialog.item_id.clone())
            .ok_or(BidError::Closed)?;
        let span = info_span!("usecase.bid_dialog.reconcile", item_id = %item_id);

        async {
            let body = self
                .backend
                .fetch_item_details(&item_id)
                .await
                .map_err(|err| {
                    warn!(error = %err, "Item details request failed");
                    BidError::Failed
                })?;
            let item = AuctionItem::from_details_response(&body, self.offset)
                .ok()
                .flatten()
                .ok_or(BidError::Failed)?;

            self.store.update_listings(|l| l.replace_item(&item)).await;
            self.refresh(&item).await
        }
        .instrument(span)
        .await
    }
}

impl Drop for BidDialog {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.get_mut().take() {
            ticker.abort();
        }
    }
}
