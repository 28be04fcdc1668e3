use std::sync::Arc;
use std::time::Duration;

use af_core::config::{AppConfig, RelayConfig};
use af_core::kyc::{KycAction, KycEvent, KycStateMachine};
use af_core::ports::{
    BackendApiPort, DigiLockerPort, KycDialogPort, PanLookupPort, VerificationResultSource,
    VerificationWaitError,
};
use af_core::verification::{AadhaarOutcome, FailureReason};
use af_core::{DocumentFile, DocumentKind, ItemId, KycError, KycItemState, UserId};
use tracing::{debug, info, info_span, warn, Instrument};

use super::tasks::{KycTasks, TaskKind};
use crate::store::AppStore;

/// Drives the three KYC steps for any number of items.
///
/// State lives in the store's KYC registry, keyed by item, so dialogs for
/// different items never share progress. Background work (the Aadhaar result
/// listener and the close-after-success timer) is tracked per item and torn
/// down when that item's dialog closes.
pub struct KycWorkflow {
    store: Arc<AppStore>,
    pan_lookup: Arc<dyn PanLookupPort>,
    backend: Arc<dyn BackendApiPort>,
    digilocker: Arc<dyn DigiLockerPort>,
    results: Arc<dyn VerificationResultSource>,
    dialog: Arc<dyn KycDialogPort>,
    relay: RelayConfig,
    close_delay: Duration,
    tasks: KycTasks,
}

impl KycWorkflow {
    pub fn new(
        store: Arc<AppStore>,
        pan_lookup: Arc<dyn PanLookupPort>,
        backend: Arc<dyn BackendApiPort>,
        digilocker: Arc<dyn DigiLockerPort>,
        results: Arc<dyn VerificationResultSource>,
        dialog: Arc<dyn KycDialogPort>,
        config: &AppConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            pan_lookup,
            backend,
            digilocker,
            results,
            dialog,
            relay: config.relay.clone(),
            close_delay: Duration::from_millis(config.verification.close_delay_ms),
            tasks: KycTasks::default(),
        })
    }

    pub async fn state(&self, item_id: &ItemId) -> KycItemState {
        self.store.kyc_state(item_id).await
    }

    /// Records PAN input. A complete PAN triggers the lookup and name
    /// comparison; a mismatch is recorded on the item and also returned as
    /// an error.
    pub async fn enter_pan(&self, item_id: &ItemId, pan: &str) -> Result<KycItemState, KycError> {
        let span = info_span!("usecase.kyc.enter_pan", item_id = %item_id);

        async {
            let event = KycEvent::PanNumberEntered {
                pan: pan.to_string(),
            };
            let user_id = self.store.user_id().await;
            if user_id.is_none() {
                // A complete PAN is only stored together with its lookup.
                let current = self.store.kyc_state(item_id).await;
                let preview = KycStateMachine::transition(&current, event.clone())?;
                if preview.actions.iter().any(|a| matches!(a, KycAction::LookupPan { .. })) {
                    warn!("PAN lookup needs a user id in session");
                    return Err(KycError::MissingUserId);
                }
            }

            let (state, actions) = self.store.apply_kyc(item_id, event).await?;
            self.dialog.kyc_state_changed(item_id, &state).await;

            let Some(pan) = actions.into_iter().find_map(|action| match action {
                KycAction::LookupPan { pan } => Some(pan),
                _ => None,
            }) else {
                return Ok(state);
            };
            let Some(user_id) = user_id else {
                return Err(KycError::MissingUserId);
            };

            let details = self.pan_lookup.lookup(&pan).await.map_err(|err| {
                warn!(error = %err, "PAN lookup failed");
                KycError::PanLookupFailed
            })?;

            let registered_name = self.store.registered_name().await;
            let (state, _) = self
                .store
                .apply_kyc(
                    item_id,
                    KycEvent::PanLookupCompleted {
                        pan: pan.clone(),
                        name_on_pan: details.name,
                        registered_name,
                        user_id: Some(user_id),
                    },
                )
                .await?;
            self.store
                .update_prefill(|prefill| prefill.pan_number = Some(pan))
                .await;
            self.dialog.kyc_state_changed(item_id, &state).await;

            if state.pan_name_matched == Some(false) {
                info!("PAN name did not match registered name");
                return Err(KycError::PanNameMismatch);
            }
            Ok(state)
        }
        .instrument(span)
        .await
    }

    /// Validates and uploads a proof document. Nothing is sent when the file
    /// is rejected locally or the step is locked.
    pub async fn upload_document(
        &self,
        item_id: &ItemId,
        kind: DocumentKind,
        file: DocumentFile,
    ) -> Result<KycItemState, KycError> {
        let span = info_span!("usecase.kyc.upload_document", item_id = %item_id, %kind);

        async {
            file.validate(kind)?;
            let user_id = self.store.user_id().await.ok_or(KycError::MissingUserId)?;

            let current = self.store.kyc_state(item_id).await;
            KycStateMachine::transition(
                &current,
                KycEvent::DocumentUploaded {
                    kind,
                    reference: String::new(),
                },
            )?;

            let reference = self
                .backend
                .upload_file(&user_id, &file)
                .await
                .map_err(|err| {
                    warn!(error = %err, "Document upload failed");
                    KycError::UploadFailed(kind)
                })?;
            debug!(size = file.len(), "Document uploaded");

            let (state, _) = self
                .store
                .apply_kyc(item_id, KycEvent::DocumentUploaded { kind, reference })
                .await?;
            self.dialog.kyc_state_changed(item_id, &state).await;
            Ok(state)
        }
        .instrument(span)
        .await
    }

    pub async fn verify_pan(&self, item_id: &ItemId) -> Result<KycItemState, KycError> {
        let span = info_span!("usecase.kyc.verify_pan", item_id = %item_id);

        async {
            let (state, _) = self.store.apply_kyc(item_id, KycEvent::VerifyPan).await?;
            info!("PAN step verified");
            self.dialog.kyc_state_changed(item_id, &state).await;
            Ok(state)
        }
        .instrument(span)
        .await
    }

    pub async fn submit_emd(&self, item_id: &ItemId, amount: &str) -> Result<KycItemState, KycError> {
        let span = info_span!("usecase.kyc.submit_emd", item_id = %item_id);

        async {
            let (state, _) = self
                .store
                .apply_kyc(
                    item_id,
                    KycEvent::SubmitEmd {
                        amount: amount.to_string(),
                    },
                )
                .await?;
            self.store
                .update_prefill(|prefill| prefill.emd_amount = state.form.emd_amount.clone())
                .await;
            info!("EMD step verified");
            self.dialog.kyc_state_changed(item_id, &state).await;
            Ok(state)
        }
        .instrument(span)
        .await
    }

    /// Creates the DigiLocker authorization URL for the caller to open and
    /// starts waiting for the result. Fails without touching state when the
    /// step is not reachable or the URL cannot be created.
    pub async fn start_aadhaar(self: &Arc<Self>, item_id: &ItemId) -> Result<String, KycError> {
        let span = info_span!("usecase.kyc.start_aadhaar", item_id = %item_id);

        async {
            let current = self.store.kyc_state(item_id).await;
            KycStateMachine::transition(&current, KycEvent::AadhaarLinkOpened)?;
            let user_id = self.store.user_id().await.ok_or(KycError::MissingUserId)?;

            let callback = self.relay.callback_url(user_id.as_str());
            let url = self
                .digilocker
                .create_authorization_url(&callback)
                .await
                .map_err(|err| {
                    warn!(error = %err, "DigiLocker URL creation failed");
                    KycError::DigiLockerUnavailable
                })?;

            let (state, actions) = self
                .store
                .apply_kyc(item_id, KycEvent::AadhaarLinkOpened)
                .await?;
            if actions.contains(&KycAction::ListenForResult) {
                self.spawn_listener(item_id, user_id).await;
            }
            self.dialog.kyc_state_changed(item_id, &state).await;
            info!("DigiLocker authorization started");
            Ok(url)
        }
        .instrument(span)
        .await
    }

    async fn spawn_listener(self: &Arc<Self>, item_id: &ItemId, user_id: UserId) {
        let workflow = Arc::clone(self);
        let item = item_id.clone();
        let span = info_span!("usecase.kyc.listen", item_id = %item_id, user_id = %user_id);

        self.tasks
            .spawn(item_id, TaskKind::Listener, move |ticket| {
                async move {
                    let result = workflow.results.await_result(&user_id).await;
                    // Release first: ingesting may abort the registered listener.
                    workflow
                        .tasks
                        .release(&item, TaskKind::Listener, ticket)
                        .await;
                    workflow.finish_listening(&item, result).await;
                }
                .instrument(span)
            })
            .await;
    }

    async fn finish_listening(
        self: &Arc<Self>,
        item_id: &ItemId,
        result: Result<AadhaarOutcome, VerificationWaitError>,
    ) {
        match result {
            Ok(outcome) => {
                if let Err(err) = self.ingest_result(item_id, outcome).await {
                    info!(error = %err, "Aadhaar verification did not complete");
                }
            }
            Err(err) => {
                warn!(error = %err, "Stopped waiting for Aadhaar result");
                match self
                    .store
                    .apply_kyc(item_id, KycEvent::AadhaarWaitTimedOut)
                    .await
                {
                    Ok((state, _)) => self.dialog.kyc_state_changed(item_id, &state).await,
                    Err(err) => debug!(error = %err, "Timeout arrived after the wait ended"),
                }
            }
        }
    }

    /// Applies an Aadhaar result, from the listener or pushed directly by a
    /// caller. On success the item is marked verified and the dialog is
    /// closed and reset after the configured delay.
    pub async fn ingest_result(
        self: &Arc<Self>,
        item_id: &ItemId,
        outcome: AadhaarOutcome,
    ) -> Result<KycItemState, KycError> {
        let span = info_span!("usecase.kyc.ingest_result", item_id = %item_id);

        async {
            let failure = match &outcome {
                AadhaarOutcome::Failed(_, message) => {
                    Some(KycError::AadhaarVerificationFailed(message.clone()))
                }
                AadhaarOutcome::Verified(_) => None,
            };

            let registered_name = self.store.registered_name().await;
            let user_id = self.store.user_id().await;
            let (state, actions) = self
                .store
                .apply_kyc(
                    item_id,
                    KycEvent::AadhaarResultReceived {
                        outcome,
                        registered_name,
                        user_id,
                    },
                )
                .await?;
            self.tasks.abort(item_id, TaskKind::Listener).await;

            for action in actions {
                match action {
                    KycAction::MarkItemVerified => {
                        self.store
                            .update_activity(|activity| activity.mark_verified(item_id))
                            .await;
                    }
                    KycAction::ScheduleCloseAndReset => self.schedule_close(item_id).await,
                    KycAction::StopListening => {
                        self.tasks.abort(item_id, TaskKind::Listener).await;
                    }
                    other => debug!(?other, "Ignoring action"),
                }
            }
            self.dialog.kyc_state_changed(item_id, &state).await;

            if let Some(err) = failure {
                return Err(err);
            }
            if state.form.aadhar_failure_reason == Some(FailureReason::NameMismatch) {
                return Err(KycError::AadhaarNameMismatch);
            }
            info!("Aadhaar verified, KYC complete");
            Ok(state)
        }
        .instrument(span)
        .await
    }

    async fn schedule_close(self: &Arc<Self>, item_id: &ItemId) {
        let workflow = Arc::clone(self);
        let item = item_id.clone();
        let delay = self.close_delay;
        let span = info_span!("usecase.kyc.close_after_success", item_id = %item_id);

        self.tasks
            .spawn(item_id, TaskKind::CloseTimer, move |ticket| {
                async move {
                    tokio::time::sleep(delay).await;
                    workflow
                        .tasks
                        .release(&item, TaskKind::CloseTimer, ticket)
                        .await;
                    workflow.reset_item(&item).await;
                    workflow.dialog.close_dialog(&item).await;
                }
                .instrument(span)
            })
            .await;
    }

    /// Stops background work for the item's dialog. Progress is kept.
    pub async fn close_dialog(&self, item_id: &ItemId) {
        self.tasks.abort_item(item_id).await;
        debug!(item_id = %item_id, "KYC dialog closed");
    }

    pub async fn reset(&self, item_id: &ItemId) {
        let span = info_span!("usecase.kyc.reset", item_id = %item_id);

        async {
            self.tasks.abort_item(item_id).await;
            self.reset_item(item_id).await;
        }
        .instrument(span)
        .await
    }

    pub async fn reset_all(&self) {
        let span = info_span!("usecase.kyc.reset_all");

        async {
            self.tasks.abort_all().await;
            self.store.reset_all_kyc().await;
            info!("All KYC progress reset");
        }
        .instrument(span)
        .await
    }

    async fn reset_item(&self, item_id: &ItemId) {
        match self.store.apply_kyc(item_id, KycEvent::Reset).await {
            Ok((state, _)) => self.dialog.kyc_state_changed(item_id, &state).await,
            Err(err) => warn!(error = %err, "KYC reset rejected"),
        }
    }

    #[cfg(test)]
    async fn is_listening(&self, item_id: &ItemId) -> bool {
        self.tasks.is_running(item_id, TaskKind::Listener).await
    }
}
