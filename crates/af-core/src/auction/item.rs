use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{AuctionStage, AuctionStatus, StageAction};
use crate::ids::{AuctionId, ItemId, UserId};
use crate::json;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuctionMappingError {
    #[error("auction item has no id")]
    MissingId,

    #[error("auction item is not a JSON object")]
    NotAnObject,
}

/// Whether the viewer currently holds the highest bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Winning,
    Losing,
}

/// One auction lot, as projected on the client.
///
/// Read-mostly: refreshed from the backend on fetch, or patched locally with
/// [`AuctionItem::apply_bid`] after a successful bid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionItem {
    pub id: ItemId,
    pub item_id: ItemId,
    pub auction_id: Option<AuctionId>,
    pub name: String,
    pub city: String,
    pub category: String,
    pub reserve_price: u64,
    pub winner_amount: u64,
    pub winner_id: Option<UserId>,
    /// The viewer's own last bid, when the backend reports it.
    pub bidder_amount: u64,
    pub increment_amount: Option<u64>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub stage: AuctionStage,
    pub status: AuctionStatus,
    pub images: Vec<String>,
    pub seller_name: String,
    pub allow_emd_upload: bool,
}

impl AuctionItem {
    /// Maps one backend item object (listing row or detail record).
    ///
    /// `offset` is the timezone the backend's bare `YYYY-MM-DD HH:mm:ss`
    /// timestamps are expressed in.
    pub fn from_api(value: &Value, offset: FixedOffset) -> Result<Self, AuctionMappingError> {
        if !value.is_object() {
            return Err(AuctionMappingError::NotAnObject);
        }

        let id = json::string(value, &["id", "item_id"]).ok_or(AuctionMappingError::MissingId)?;
        let item_id = json::string(value, &["item_id", "id"]).unwrap_or_else(|| id.clone());

        let winner_id = json::string(value, &["winner_id"])
            .map(UserId::from)
            .filter(|id| !id.is_unset());

        let stage = json::string(value, &["stage"])
            .map(|s| AuctionStage::parse(&s))
            .unwrap_or(AuctionStage::Bidding);

        let status = json::string(value, &["status", "item_status"])
            .map(|s| AuctionStatus::parse(&s))
            .unwrap_or_default();

        Ok(Self {
            id: ItemId::from(id),
            item_id: ItemId::from(item_id),
            auction_id: json::string(value, &["auction_id"])
                .map(AuctionId::from)
                .filter(|id| !id.is_unset()),
            name: json::string(value, &["name", "title"]).unwrap_or_default(),
            city: json::string(value, &["city_name", "city"]).unwrap_or_default(),
            category: json::string(value, &["category_name", "category"]).unwrap_or_default(),
            reserve_price: json::amount(value, &["reserve_price", "base_price", "basePrice"])
                .unwrap_or(0),
            winner_amount: json::amount(value, &["winner_amount"]).unwrap_or(0),
            winner_id,
            bidder_amount: json::amount(value, &["bidder_amount"]).unwrap_or(0),
            increment_amount: json::amount(value, &["increment_amount"]).filter(|a| *a > 0),
            start_at: json::string(value, &["start_datetime", "startDate"])
                .and_then(|s| json::timestamp(&s, offset)),
            end_at: json::string(value, &["end_datetime", "endDate"])
                .and_then(|s| json::timestamp(&s, offset)),
            stage,
            status,
            images: images_of(value),
            seller_name: json::string(value, &["seller_name", "sellerType"]).unwrap_or_default(),
            allow_emd_upload: json::flag(value, &["allow_emd_upload"]),
        })
    }

    /// Maps an `auctions/item-details/<id>` response: the record is the first
    /// element of `result` (or `result` itself when it is an object).
    pub fn from_details_response(
        response: &Value,
        offset: FixedOffset,
    ) -> Result<Option<Self>, AuctionMappingError> {
        let record = match response.get("result") {
            Some(Value::Array(rows)) => rows.first(),
            Some(obj @ Value::Object(_)) => Some(obj),
            _ => None,
        };
        record.map(|r| Self::from_api(r, offset)).transpose()
    }

    /// Lots flagged for EMD upload are in verification regardless of the
    /// stage the backend reports.
    pub fn effective_stage(&self) -> AuctionStage {
        if self.allow_emd_upload {
            AuctionStage::Verification
        } else {
            self.stage
        }
    }

    pub fn primary_action(&self) -> StageAction {
        self.effective_stage().primary_action()
    }

    pub fn bid_status(&self) -> BidStatus {
        if self.bidder_amount > 0 && self.bidder_amount == self.winner_amount {
            BidStatus::Winning
        } else {
            BidStatus::Losing
        }
    }

    /// Local patch after the current user's bid was accepted.
    pub fn apply_bid(&mut self, amount: u64, user_id: &UserId) {
        self.winner_amount = amount;
        self.winner_id = Some(user_id.clone());
        self.bidder_amount = amount;
    }
}

fn images_of(value: &Value) -> Vec<String> {
    match value.get("images") {
        Some(Value::Array(images)) => images
            .iter()
            .filter_map(|img| match img {
                Value::String(url) => Some(url.clone()),
                other => json::string(other, &["image_url", "url"]),
            })
            .collect(),
        _ => Vec::new(),
    }
}
