//! End-to-end journey through the application layer: OTP login, KYC with the
//! result arriving as a window message, then a bid. Remote services are
//! hand-written fakes; persistence and the message channel are the real
//! adapters.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use af_app::{AppDeps, AppStore, AppUseCases};
use af_core::bid::BidRequest;
use af_core::config::AppConfig;
use af_core::enquiry::{EnquiryRequest, UpdateUserRequest};
use af_core::listings::ListingsQuery;
use af_core::ports::*;
use af_core::verification::WindowMessage;
use af_core::{
    AadhaarIdentity, AuctionItem, DocumentFile, DocumentKind, ItemId, KycItemState, KycStep,
    LoginOutcome, UserId,
};
use af_infra::{message_channel, FileStatePersistence};
use async_trait::async_trait;
use chrono::FixedOffset;
use serde_json::{json, Value};

const ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
struct FakeBackend {
    uploads: AtomicUsize,
    bids: Mutex<Vec<BidRequest>>,
}

#[async_trait]
impl BackendApiPort for FakeBackend {
    async fn send_otp(&self, _phone: &str) -> Result<Value, ApiError> {
        Ok(json!({ "success": true }))
    }

    async fn login(&self, _phone: &str, otp: &str) -> Result<Value, ApiError> {
        if otp != "123456" {
            return Err(ApiError::Rejected("Invalid OTP".into()));
        }
        Ok(json!({
            "success": true,
            "result": {
                "access_token": { "access_token": "tok-journey" },
                "user": { "id": 77, "name": "Asha Rao", "email": "asha@example.com" },
                "new_user": false
            }
        }))
    }

    async fn fetch_listings(&self, _query: &ListingsQuery) -> Result<Value, ApiError> {
        Ok(json!({ "data": [lot()], "total": 1, "page": 1 }))
    }

    async fn fetch_item_details(&self, _item_id: &ItemId) -> Result<Value, ApiError> {
        Ok(json!({ "result": [lot()] }))
    }

    async fn fetch_filters_data(&self) -> Result<Value, ApiError> {
        Ok(json!({ "result": {} }))
    }

    async fn submit_enquiry(&self, _request: &EnquiryRequest) -> Result<Value, ApiError> {
        Ok(json!({ "success": true }))
    }

    async fn update_user(&self, _request: &UpdateUserRequest) -> Result<Value, ApiError> {
        Ok(json!({ "success": true }))
    }

    async fn place_bid(&self, _user_id: &UserId, request: &BidRequest) -> Result<Value, ApiError> {
        self.bids.lock().unwrap().push(request.clone());
        Ok(json!({ "success": true }))
    }

    async fn upload_file(&self, user_id: &UserId, file: &DocumentFile) -> Result<String, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("kyc/{user_id}/{}", file.file_name))
    }
}

struct FakeKycServices;

#[async_trait]
impl PanLookupPort for FakeKycServices {
    async fn lookup(&self, _pan: &str) -> Result<PanDetails, ApiError> {
        Ok(PanDetails {
            name: Some("ASHA RAO".into()),
            raw: Value::Null,
        })
    }
}

#[async_trait]
impl DigiLockerPort for FakeKycServices {
    async fn create_authorization_url(&self, callback_url: &str) -> Result<String, ApiError> {
        assert!(callback_url.ends_with("/api/verify-aadhaar-webhook?user_id=77"));
        Ok("https://digilocker.example/authorize".into())
    }

    async fn fetch_eaadhaar(&self, _request_id: &str) -> Result<AadhaarIdentity, ApiError> {
        Err(ApiError::Transport("not used by the message transport".into()))
    }
}

#[derive(Default)]
struct RecordingDialog {
    closed: Mutex<Vec<ItemId>>,
}

#[async_trait]
impl KycDialogPort for RecordingDialog {
    async fn kyc_state_changed(&self, _item_id: &ItemId, _state: &KycItemState) {}

    async fn close_dialog(&self, item_id: &ItemId) {
        self.closed.lock().unwrap().push(item_id.clone());
    }
}

struct FixedClock;

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        // 2025-01-01T00:00:00Z
        1_735_689_600_000
    }
}

fn lot() -> Value {
    json!({
        "id": 9,
        "item_id": 9,
        "name": "Warehouse, Bhiwandi",
        "reserve_price": 100000,
        "winner_amount": 0,
        "increment_amount": 10000,
        "end_datetime": "2030-01-01 00:00:00",
        "stage": "bidding",
        "status": "Live"
    })
}

fn pdf(name: &str) -> DocumentFile {
    DocumentFile::new(name, "application/pdf", b"%PDF-1.4".to_vec())
}

async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..400 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn login_kyc_and_bid_journey() {
    let state_dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(AppStore::new(Arc::new(FileStatePersistence::new(
        state_dir.path(),
    ))));
    store.hydrate().await;

    let mut config = AppConfig::default();
    config.verification.close_delay_ms = 20;
    let (sender, results) = message_channel(ORIGIN, 8);
    let backend = Arc::new(FakeBackend::default());
    let dialog = Arc::new(RecordingDialog::default());
    let usecases = AppUseCases::new(AppDeps {
        backend: backend.clone(),
        pan_lookup: Arc::new(FakeKycServices),
        digilocker: Arc::new(FakeKycServices),
        verification_results: Arc::new(results),
        kyc_dialog: dialog.clone(),
        clock: Arc::new(FixedClock),
        store: store.clone(),
        config,
    });

    // Login
    usecases.send_otp().execute("9999999999").await.unwrap();
    let outcome = usecases
        .verify_otp()
        .execute("9999999999", "123456")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::ReturningUser);

    // Listings
    let live = usecases.fetch_listings().live(1, 21).await.unwrap();
    assert_eq!(live.len(), 1);
    let item = ItemId::from("9");

    // KYC
    let kyc = usecases.kyc();
    kyc.enter_pan(&item, "ABCDE1234F").await.unwrap();
    kyc.upload_document(&item, DocumentKind::Pan, pdf("pan.pdf"))
        .await
        .unwrap();
    kyc.verify_pan(&item).await.unwrap();
    kyc.upload_document(&item, DocumentKind::Emd, pdf("emd.pdf"))
        .await
        .unwrap();
    let state = kyc.submit_emd(&item, "25000").await.unwrap();
    assert_eq!(state.current_step, KycStep::Aadhaar);
    assert_eq!(backend.uploads.load(Ordering::SeqCst), 2);

    let url = kyc.start_aadhaar(&item).await.unwrap();
    assert_eq!(url, "https://digilocker.example/authorize");

    eventually("listener subscribed", || {
        let sender = sender.clone();
        async move { sender.active_waiters() == 1 }
    })
    .await;
    assert!(sender.post(WindowMessage::new(
        "https://elsewhere.example",
        json!({ "type": "aadhaarVerification", "payload": { "success": false } }),
    )));
    assert!(sender.post(WindowMessage::new(
        ORIGIN,
        json!({
            "type": "aadhaarVerification",
            "payload": {
                "success": true,
                "data": { "data": { "userName": "Asha Rao", "maskedAadhaarNo": "xxxxxxxx1234" } }
            }
        }),
    )));

    eventually("item verified", || {
        let store = store.clone();
        let item = item.clone();
        async move { store.activity().await.is_verified(&item) }
    })
    .await;
    eventually("dialog closed", || {
        let dialog = dialog.clone();
        let item = item.clone();
        async move { dialog.closed.lock().unwrap().contains(&item) }
    })
    .await;
    assert_eq!(store.kyc_state(&item).await.current_step, KycStep::Pan);

    // Bid
    let lot = AuctionItem::from_api(&lot(), FixedOffset::east_opt(330 * 60).unwrap()).unwrap();
    let bid = usecases.bid_dialog();
    let opened = bid.open(&lot).await;
    assert_eq!(opened.bid_amount, 110_000);
    assert!(!opened.is_expired);

    let placed = bid.submit().await.unwrap();
    assert_eq!(placed.amount, 110_000);
    assert_eq!(placed.next_min_bid, 120_000);
    assert_eq!(backend.bids.lock().unwrap().len(), 1);
    assert_eq!(
        store.listings().await.live.data[0].winner_amount,
        110_000
    );
    bid.close().await;

    // A restart sees the same session and activity.
    let restored = AppStore::new(Arc::new(FileStatePersistence::new(state_dir.path())));
    restored.hydrate().await;
    assert_eq!(restored.user_id().await, Some(UserId::from("77")));
    assert!(restored.activity().await.is_verified(&item));
    assert_eq!(restored.activity().await.last_bid(&item), Some(110_000));
}

#[tokio::test]
async fn wrong_otp_leaves_no_session() {
    let store = Arc::new(AppStore::new(Arc::new(af_infra::NoopStatePersistence)));
    let (_sender, results) = message_channel(ORIGIN, 1);
    let usecases = AppUseCases::new(AppDeps {
        backend: Arc::new(FakeBackend::default()),
        pan_lookup: Arc::new(FakeKycServices),
        digilocker: Arc::new(FakeKycServices),
        verification_results: Arc::new(results),
        kyc_dialog: Arc::new(RecordingDialog::default()),
        clock: Arc::new(FixedClock),
        store: store.clone(),
        config: AppConfig::default(),
    });

    let err = usecases
        .verify_otp()
        .execute("9999999999", "000000")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid OTP");
    assert_eq!(store.user_id().await, None);
    assert_eq!(store.session().await.error.as_deref(), Some("Invalid OTP"));
}
