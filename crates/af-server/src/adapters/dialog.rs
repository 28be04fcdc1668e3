use af_core::ports::KycDialogPort;
use af_core::{ItemId, KycItemState};
use async_trait::async_trait;
use tracing::info;

/// KYC dialog port for a headless process: state changes are logged instead
/// of rendered.
pub struct TracingKycDialog;

#[async_trait]
impl KycDialogPort for TracingKycDialog {
    async fn kyc_state_changed(&self, item_id: &ItemId, state: &KycItemState) {
        info!(
            item_id = %item_id,
            step = state.current_step.number(),
            pan_verified = state.pan_verified,
            emd_verified = state.emd_verified,
            aadhaar_verified = state.aadhaar_verified,
            pan_verify_enabled = state.can_verify_pan(),
            emd_submit_enabled =
                state.can_submit_emd(state.form.emd_amount.as_deref().unwrap_or_default()),
            "KYC state changed"
        );
    }

    async fn close_dialog(&self, item_id: &ItemId) {
        info!(item_id = %item_id, "KYC dialog closed");
    }
}
