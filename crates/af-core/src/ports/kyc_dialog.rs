use async_trait::async_trait;

use crate::ids::ItemId;
use crate::kyc::KycItemState;

/// Outbound notifications to whatever presents the KYC dialog.
#[async_trait]
pub trait KycDialogPort: Send + Sync {
    async fn kyc_state_changed(&self, item_id: &ItemId, state: &KycItemState);

    async fn close_dialog(&self, item_id: &ItemId);
}
