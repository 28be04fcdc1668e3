//! Application state container.
//!
//! Each slice sits behind its own lock and is only mutated through the
//! store's methods. Writes to persisted slices are saved through the
//! [`StatePersistencePort`]; persistence failures are logged and never fail
//! the operation that caused them.

mod snapshot;

use std::sync::Arc;

use af_core::enquiry::FormPrefill;
use af_core::kyc::{KycAction, KycEvent};
use af_core::listings::{FiltersState, ListingsState};
use af_core::ports::{AccessTokenPort, StatePersistencePort};
use af_core::{ItemId, KycError, KycItemState, KycRegistry, Session, SessionState, UserActivity, UserId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub use snapshot::{RootSnapshot, ACTIVITY_KEY, PREFILL_KEY, ROOT_KEY};

pub struct AppStore {
    session: RwLock<SessionState>,
    listings: RwLock<ListingsState>,
    filters: RwLock<FiltersState>,
    kyc: RwLock<KycRegistry>,
    activity: RwLock<UserActivity>,
    prefill: RwLock<FormPrefill>,
    persistence: Arc<dyn StatePersistencePort>,
}

impl AppStore {
    pub fn new(persistence: Arc<dyn StatePersistencePort>) -> Self {
        Self {
            session: RwLock::new(SessionState::default()),
            listings: RwLock::new(ListingsState::default()),
            filters: RwLock::new(FiltersState::default()),
            kyc: RwLock::new(KycRegistry::default()),
            activity: RwLock::new(UserActivity::default()),
            prefill: RwLock::new(FormPrefill::default()),
            persistence,
        }
    }

    /// Restores persisted slices. Missing or unreadable keys leave the
    /// corresponding slices at their defaults.
    pub async fn hydrate(&self) {
        if let Some(root) = self.load::<RootSnapshot>(ROOT_KEY).await {
            self.session.write().await.session = root.session;
            *self.listings.write().await = root.listings;
            *self.kyc.write().await = root.kyc;
        }
        if let Some(activity) = self.load::<UserActivity>(ACTIVITY_KEY).await {
            *self.activity.write().await = activity;
        }
        if let Some(prefill) = self.load::<FormPrefill>(PREFILL_KEY).await {
            *self.prefill.write().await = prefill;
        }
        debug!("Store hydrated");
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.persistence.load(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warn!(key, error = %err, "Discarding unreadable persisted state");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key, error = %err, "Failed to load persisted state");
                None
            }
        }
    }

    async fn save<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "Failed to serialize state");
                return;
            }
        };
        if let Err(err) = self.persistence.save(key, &value).await {
            warn!(key, error = %err, "Failed to persist state");
        }
    }

    async fn persist_root(&self) {
        let snapshot = RootSnapshot {
            session: self.session.read().await.session.clone(),
            listings: self.listings.read().await.clone(),
            kyc: self.kyc.read().await.clone(),
        };
        self.save(ROOT_KEY, &snapshot).await;
    }

    // --- session -----------------------------------------------------------

    pub async fn session(&self) -> SessionState {
        self.session.read().await.clone()
    }

    pub async fn user_id(&self) -> Option<UserId> {
        self.session.read().await.user_id().cloned()
    }

    /// Name the PAN and Aadhaar names are compared against.
    pub async fn registered_name(&self) -> String {
        self.session
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    pub async fn begin_login(&self) {
        let mut session = self.session.write().await;
        session.loading = true;
        session.error = None;
    }

    pub async fn complete_login(&self, new_session: Session) {
        {
            let mut session = self.session.write().await;
            session.session = Some(new_session);
            session.loading = false;
            session.error = None;
        }
        self.persist_root().await;
    }

    pub async fn fail_login(&self, message: impl Into<String>) {
        let mut session = self.session.write().await;
        session.loading = false;
        session.error = Some(message.into());
    }

    /// Fills the profile of a freshly registered user.
    pub async fn complete_registration(&self, name: &str, email: &str) {
        {
            let mut session = self.session.write().await;
            if let Some(s) = session.session.as_mut() {
                s.name = name.to_string();
                s.email = email.to_string();
                s.new_user = false;
            }
        }
        self.persist_root().await;
    }

    pub async fn clear_session(&self) {
        *self.session.write().await = SessionState::default();
        self.persist_root().await;
    }

    // --- listings ----------------------------------------------------------

    pub async fn listings(&self) -> ListingsState {
        self.listings.read().await.clone()
    }

    pub async fn update_listings<R>(&self, f: impl FnOnce(&mut ListingsState) -> R) -> R {
        let result = f(&mut *self.listings.write().await);
        self.persist_root().await;
        result
    }

    /// Patches every cached copy of the item after an accepted bid.
    pub async fn apply_bid(&self, item_id: &ItemId, amount: u64, user_id: &UserId) -> bool {
        self.update_listings(|listings| listings.apply_bid(item_id, amount, user_id))
            .await
    }

    // --- filters -----------------------------------------------------------

    pub async fn filters(&self) -> FiltersState {
        self.filters.read().await.clone()
    }

    pub async fn update_filters<R>(&self, f: impl FnOnce(&mut FiltersState) -> R) -> R {
        f(&mut *self.filters.write().await)
    }

    // --- kyc ---------------------------------------------------------------

    pub async fn kyc_state(&self, item_id: &ItemId) -> KycItemState {
        self.kyc.read().await.snapshot(item_id)
    }

    /// Applies a KYC event to the item's state. Rejected events change
    /// nothing and are not persisted.
    pub async fn apply_kyc(
        &self,
        item_id: &ItemId,
        event: KycEvent,
    ) -> Result<(KycItemState, Vec<KycAction>), KycError> {
        let (state, actions) = {
            let mut registry = self.kyc.write().await;
            let actions = registry.apply(item_id, event)?;
            (registry.snapshot(item_id), actions)
        };
        self.persist_root().await;
        Ok((state, actions))
    }

    pub async fn reset_all_kyc(&self) {
        self.kyc.write().await.reset_all();
        self.persist_root().await;
    }

    // --- activity ----------------------------------------------------------

    pub async fn activity(&self) -> UserActivity {
        self.activity.read().await.clone()
    }

    pub async fn update_activity<R>(&self, f: impl FnOnce(&mut UserActivity) -> R) -> R {
        let (result, snapshot) = {
            let mut activity = self.activity.write().await;
            let result = f(&mut activity);
            (result, activity.clone())
        };
        self.save(ACTIVITY_KEY, &snapshot).await;
        result
    }

    // --- form prefill ------------------------------------------------------

    pub async fn prefill(&self) -> FormPrefill {
        self.prefill.read().await.clone()
    }

    pub async fn update_prefill(&self, f: impl FnOnce(&mut FormPrefill)) {
        let snapshot = {
            let mut prefill = self.prefill.write().await;
            f(&mut prefill);
            prefill.clone()
        };
        self.save(PREFILL_KEY, &snapshot).await;
    }
}

#[async_trait]
impl AccessTokenPort for AppStore {
    async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token().map(str::to_string)
    }
}
