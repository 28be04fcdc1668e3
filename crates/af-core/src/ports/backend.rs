use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;
use crate::bid::BidRequest;
use crate::enquiry::{EnquiryRequest, UpdateUserRequest};
use crate::ids::{ItemId, UserId};
use crate::kyc::DocumentFile;
use crate::listings::ListingsQuery;

/// The storefront backend REST API.
///
/// Methods return the decoded JSON body; responses flagged
/// `success: false` surface as [`ApiError::Rejected`].
#[async_trait]
pub trait BackendApiPort: Send + Sync {
    async fn send_otp(&self, phone: &str) -> Result<Value, ApiError>;

    async fn login(&self, phone: &str, otp: &str) -> Result<Value, ApiError>;

    async fn fetch_listings(&self, query: &ListingsQuery) -> Result<Value, ApiError>;

    async fn fetch_item_details(&self, item_id: &ItemId) -> Result<Value, ApiError>;

    async fn fetch_filters_data(&self) -> Result<Value, ApiError>;

    async fn submit_enquiry(&self, request: &EnquiryRequest) -> Result<Value, ApiError>;

    async fn update_user(&self, request: &UpdateUserRequest) -> Result<Value, ApiError>;

    async fn place_bid(&self, user_id: &UserId, request: &BidRequest) -> Result<Value, ApiError>;

    /// Uploads a KYC document and returns the stored file reference.
    async fn upload_file(&self, user_id: &UserId, file: &DocumentFile) -> Result<String, ApiError>;
}
