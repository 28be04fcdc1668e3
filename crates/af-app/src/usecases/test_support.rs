//! Shared fakes for use case unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use af_core::bid::BidRequest;
use af_core::enquiry::{EnquiryRequest, UpdateUserRequest};
use af_core::kyc::DocumentFile;
use af_core::listings::ListingsQuery;
use af_core::ports::{
    ApiError, BackendApiPort, ClockPort, DigiLockerPort, KycDialogPort, PanDetails, PanLookupPort,
    StatePersistencePort, VerificationResultSource, VerificationWaitError,
};
use af_core::verification::{AadhaarIdentity, AadhaarOutcome};
use af_core::{ItemId, KycItemState, Session, UserId};
use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::store::AppStore;

mock! {
    pub Backend {}

    #[async_trait]
    impl BackendApiPort for Backend {
        async fn send_otp(&self, phone: &str) -> Result<Value, ApiError>;
        async fn login(&self, phone: &str, otp: &str) -> Result<Value, ApiError>;
        async fn fetch_listings(&self, query: &ListingsQuery) -> Result<Value, ApiError>;
        async fn fetch_item_details(&self, item_id: &ItemId) -> Result<Value, ApiError>;
        async fn fetch_filters_data(&self) -> Result<Value, ApiError>;
        async fn submit_enquiry(&self, request: &EnquiryRequest) -> Result<Value, ApiError>;
        async fn update_user(&self, request: &UpdateUserRequest) -> Result<Value, ApiError>;
        async fn place_bid(&self, user_id: &UserId, request: &BidRequest) -> Result<Value, ApiError>;
        async fn upload_file(&self, user_id: &UserId, file: &DocumentFile) -> Result<String, ApiError>;
    }
}

mock! {
    pub PanLookup {}

    #[async_trait]
    impl PanLookupPort for PanLookup {
        async fn lookup(&self, pan: &str) -> Result<PanDetails, ApiError>;
    }
}

mock! {
    pub DigiLocker {}

    #[async_trait]
    impl DigiLockerPort for DigiLocker {
        async fn create_authorization_url(&self, callback_url: &str) -> Result<String, ApiError>;
        async fn fetch_eaadhaar(&self, request_id: &str) -> Result<AadhaarIdentity, ApiError>;
    }
}

/// Result source driven by the test through a oneshot channel. Without a
/// channel it never resolves.
pub struct ScriptedResults {
    rx: tokio::sync::Mutex<Option<oneshot::Receiver<Result<AadhaarOutcome, VerificationWaitError>>>>,
}

impl ScriptedResults {
    pub fn channel() -> (
        oneshot::Sender<Result<AadhaarOutcome, VerificationWaitError>>,
        Self,
    ) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                rx: tokio::sync::Mutex::new(Some(rx)),
            },
        )
    }

    pub fn pending() -> Self {
        Self {
            rx: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl VerificationResultSource for ScriptedResults {
    async fn await_result(&self, _user_id: &UserId) -> Result<AadhaarOutcome, VerificationWaitError> {
        let rx = self.rx.lock().await.take();
        match rx {
            Some(rx) => rx.await.unwrap_or(Err(VerificationWaitError::Closed)),
            None => std::future::pending().await,
        }
    }
}

/// Records dialog notifications.
#[derive(Default)]
pub struct RecordingDialog {
    pub closed: Mutex<Vec<ItemId>>,
    pub changes: Mutex<Vec<(ItemId, KycItemState)>>,
}

#[async_trait]
impl KycDialogPort for RecordingDialog {
    async fn kyc_state_changed(&self, item_id: &ItemId, state: &KycItemState) {
        self.changes
            .lock()
            .unwrap()
            .push((item_id.clone(), state.clone()));
    }

    async fn close_dialog(&self, item_id: &ItemId) {
        self.closed.lock().unwrap().push(item_id.clone());
    }
}

/// Settable clock.
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn at(ms: i64) -> Self {
        Self(AtomicI64::new(ms))
    }

    pub fn advance_ms(&self, ms: i64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Keeps persisted values in a map.
#[derive(Default)]
pub struct MemoryPersistence {
    pub values: Mutex<HashMap<String, Value>>,
}

#[async_trait]
impl StatePersistencePort for MemoryPersistence {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn memory_store() -> Arc<AppStore> {
    Arc::new(AppStore::new(Arc::new(MemoryPersistence::default())))
}

pub fn session(name: &str) -> Session {
    Session {
        access_token: "tok".into(),
        user_id: UserId::from("77"),
        phone: "9999999999".into(),
        name: name.into(),
        email: "buyer@example.com".into(),
        new_user: false,
    }
}

pub async fn logged_in_store(name: &str) -> Arc<AppStore> {
    let store = memory_store();
    store.complete_login(session(name)).await;
    store
}
