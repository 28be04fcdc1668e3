use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, UserId};
use crate::verification::FailureReason;

pub const PAN_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum KycStep {
    #[default]
    Pan = 1,
    Emd = 2,
    Aadhaar = 3,
}

impl KycStep {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for KycStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Where the DigiLocker authorization stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AadhaarPhase {
    #[default]
    Idle,
    /// Popup opened; `aadhaar_verified` is provisionally set until a result
    /// arrives.
    AwaitingResult,
    Completed,
}

/// Values accumulated while the steps complete; submitted with the
/// verification request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycFormData {
    pub item_id: Option<ItemId>,
    pub user_id: Option<UserId>,
    pub name_on_pan: Option<String>,
    pub pan_no: Option<String>,
    pub pan_verification_step_1: bool,
    pub pan_failure_reason: Option<FailureReason>,
    pub name_on_aadhar: Option<String>,
    pub aadhar_no: Option<String>,
    pub aadhar_verification_step_1: bool,
    pub aadhar_failure_reason: Option<FailureReason>,
    pub emd_proof: Option<String>,
    pub pan_proof: Option<String>,
    pub address_proof: Option<String>,
    pub emd_amount: Option<String>,
}

/// KYC progress for one auction item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycItemState {
    pub current_step: KycStep,
    pub pan_verified: bool,
    pub emd_verified: bool,
    pub aadhaar_verified: bool,
    pub pan_number: String,
    /// `None` until a lookup for the current PAN has returned.
    pub pan_name_matched: Option<bool>,
    pub form: KycFormData,
    #[serde(default)]
    pub aadhaar_phase: AadhaarPhase,
}

impl KycItemState {
    pub fn for_item(item_id: ItemId) -> Self {
        Self {
            form: KycFormData {
                item_id: Some(item_id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Whether the PAN "verify" action should be enabled.
    pub fn can_verify_pan(&self) -> bool {
        self.current_step == KycStep::Pan
            && self.pan_number.len() == PAN_LENGTH
            && self.pan_name_matched == Some(true)
            && self.form.pan_proof.is_some()
    }

    /// Whether the EMD "submit" action should be enabled for the amount
    /// currently typed in.
    pub fn can_submit_emd(&self, pending_amount: &str) -> bool {
        self.current_step == KycStep::Emd
            && !pending_amount.trim().is_empty()
            && self.form.emd_proof.is_some()
    }

    pub fn is_awaiting_aadhaar(&self) -> bool {
        self.aadhaar_phase == AadhaarPhase::AwaitingResult
    }

    pub fn is_complete(&self) -> bool {
        self.aadhaar_phase == AadhaarPhase::Completed
    }
}
