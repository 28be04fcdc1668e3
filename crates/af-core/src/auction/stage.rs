use serde::{Deserialize, Serialize};

/// The action a user must take next on a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStage {
    #[default]
    Enquiry,
    Verification,
    Bidding,
}

impl AuctionStage {
    /// Unknown stage names fall back to `Enquiry`, the least privileged stage.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verification" => Self::Verification,
            "bidding" => Self::Bidding,
            _ => Self::Enquiry,
        }
    }

    pub fn primary_action(self) -> StageAction {
        match self {
            Self::Enquiry => StageAction::Enquire,
            Self::Verification => StageAction::UploadDocuments,
            Self::Bidding => StageAction::PlaceBid,
        }
    }
}

/// Call-to-action offered by a listing card or the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    Enquire,
    UploadDocuments,
    PlaceBid,
}

impl StageAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Enquire => "Enquire Now",
            Self::UploadDocuments => "Upload Documents",
            Self::PlaceBid => "Place Bid",
        }
    }
}

/// Listing status as shown to buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Live,
    Upcoming,
    Other(String),
}

impl AuctionStatus {
    /// Accepts display names as well as the numeric `item_status` codes
    /// (`2` live, `3` upcoming).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "live" | "2" => Self::Live,
            "upcoming" | "3" => Self::Upcoming,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    pub fn item_status_code(&self) -> Option<u8> {
        match self {
            Self::Live => Some(2),
            Self::Upcoming => Some(3),
            Self::Other(_) => None,
        }
    }
}

impl Default for AuctionStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}
