//! KYC state machine.
//!
//! Pure transition function over [`KycItemState`]. Network calls and timers are
//! requested through [`KycAction`]s and performed by the caller.

use tracing::debug;

use super::{AadhaarPhase, DocumentKind, KycError, KycItemState, KycStep, PAN_LENGTH};
use crate::ids::UserId;
use crate::verification::{AadhaarOutcome, FailureReason};

/// Inputs that drive one item's KYC flow.
#[derive(Debug, Clone, PartialEq)]
pub enum KycEvent {
    PanNumberEntered {
        pan: String,
    },
    PanLookupCompleted {
        pan: String,
        name_on_pan: Option<String>,
        registered_name: String,
        user_id: Option<UserId>,
    },
    DocumentUploaded {
        kind: DocumentKind,
        reference: String,
    },
    VerifyPan,
    SubmitEmd {
        amount: String,
    },
    AadhaarLinkOpened,
    AadhaarResultReceived {
        outcome: AadhaarOutcome,
        registered_name: String,
        user_id: Option<UserId>,
    },
    AadhaarWaitTimedOut,
    Reset,
}

/// Side-effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycAction {
    LookupPan { pan: String },
    ListenForResult,
    StopListening,
    MarkItemVerified,
    /// Close the dialog after the configured delay, then reset the item.
    ScheduleCloseAndReset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KycTransition {
    pub state: KycItemState,
    pub actions: Vec<KycAction>,
}

impl KycTransition {
    fn to(state: KycItemState) -> Self {
        Self {
            state,
            actions: Vec::new(),
        }
    }

    fn with(state: KycItemState, actions: Vec<KycAction>) -> Self {
        Self { state, actions }
    }
}

/// Case- and whitespace-insensitive name comparison. Empty names never match.
pub fn names_match(a: &str, b: &str) -> bool {
    let normalize = |s: &str| {
        s.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let (a, b) = (normalize(a), normalize(b));
    !a.is_empty() && a == b
}

pub struct KycStateMachine;

impl KycStateMachine {
    /// Applies `event` to `state`. An `Err` means the event was rejected and
    /// the caller's state stays as it was.
    pub fn transition(state: &KycItemState, event: KycEvent) -> Result<KycTransition, KycError> {
        let mut next = state.clone();
        match event {
            KycEvent::Reset => {
                let fresh = match state.form.item_id.clone() {
                    Some(item_id) => KycItemState::for_item(item_id),
                    None => KycItemState::default(),
                };
                Ok(KycTransition::with(fresh, vec![KycAction::StopListening]))
            }

            KycEvent::PanNumberEntered { pan } => {
                require_step(state, KycStep::Pan)?;
                let pan: String = pan
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .take(PAN_LENGTH)
                    .collect::<String>()
                    .to_ascii_uppercase();
                if pan == state.pan_number {
                    return Ok(KycTransition::to(next));
                }

                next.pan_number = pan.clone();
                next.pan_name_matched = None;
                next.form.pan_failure_reason = None;
                next.form.name_on_pan = None;
                next.form.pan_no = Some(pan.clone()).filter(|p| !p.is_empty());

                let actions = if pan.len() == PAN_LENGTH {
                    vec![KycAction::LookupPan { pan }]
                } else {
                    Vec::new()
                };
                Ok(KycTransition::with(next, actions))
            }

            KycEvent::PanLookupCompleted {
                pan,
                name_on_pan,
                registered_name,
                user_id,
            } => {
                require_step(state, KycStep::Pan)?;
                if pan != state.pan_number {
                    debug!("Discarding PAN lookup for a superseded PAN");
                    return Ok(KycTransition::to(next));
                }

                let matched = name_on_pan
                    .as_deref()
                    .is_some_and(|name| names_match(name, &registered_name));
                next.pan_name_matched = Some(matched);
                next.form.name_on_pan = name_on_pan;
                next.form.pan_no = Some(pan);
                next.form.user_id = user_id.or(next.form.user_id);
                next.form.pan_verification_step_1 = false;
                next.form.pan_failure_reason = (!matched).then_some(FailureReason::NameMismatch);
                Ok(KycTransition::to(next))
            }

            KycEvent::DocumentUploaded { kind, reference } => {
                match kind {
                    DocumentKind::Pan => {
                        require_step(state, KycStep::Pan)?;
                        next.form.pan_proof = Some(reference);
                    }
                    DocumentKind::Emd => {
                        require_step(state, KycStep::Emd)?;
                        next.form.emd_proof = Some(reference);
                    }
                }
                Ok(KycTransition::to(next))
            }

            KycEvent::VerifyPan => {
                require_step(state, KycStep::Pan)?;
                if state.pan_number.len() != PAN_LENGTH {
                    return Err(KycError::InvalidPan);
                }
                if state.form.pan_proof.is_none() {
                    return Err(KycError::ProofNotUploaded(DocumentKind::Pan));
                }
                if state.pan_name_matched != Some(true) {
                    return Err(KycError::PanNameNotMatched);
                }
                next.pan_verified = true;
                next.form.pan_verification_step_1 = true;
                next.current_step = KycStep::Emd;
                Ok(KycTransition::to(next))
            }

            KycEvent::SubmitEmd { amount } => {
                require_step(state, KycStep::Emd)?;
                let amount = amount.trim();
                if amount.is_empty() {
                    return Err(KycError::EmdAmountMissing);
                }
                if state.form.emd_proof.is_none() {
                    return Err(KycError::ProofNotUploaded(DocumentKind::Emd));
                }
                next.form.emd_amount = Some(amount.to_string());
                next.emd_verified = true;
                next.current_step = KycStep::Aadhaar;
                Ok(KycTransition::to(next))
            }

            KycEvent::AadhaarLinkOpened => {
                require_step(state, KycStep::Aadhaar)?;
                if !state.pan_verified || !state.emd_verified {
                    return Err(KycError::StepLocked {
                        current: KycStep::Emd,
                        attempted: KycStep::Aadhaar,
                    });
                }
                next.aadhaar_verified = true;
                next.aadhaar_phase = AadhaarPhase::AwaitingResult;
                next.form.aadhar_failure_reason = None;
                Ok(KycTransition::with(next, vec![KycAction::ListenForResult]))
            }

            KycEvent::AadhaarResultReceived {
                outcome,
                registered_name,
                user_id,
            } => {
                if !state.is_awaiting_aadhaar() {
                    return Err(KycError::NotAwaitingAadhaar);
                }
                next.form.user_id = user_id.or(next.form.user_id);

                match outcome {
                    AadhaarOutcome::Failed(reason, _) => {
                        fail_aadhaar(&mut next, reason);
                        Ok(KycTransition::to(next))
                    }
                    AadhaarOutcome::Verified(identity) => {
                        let matched = names_match(&identity.name, &registered_name);
                        next.form.name_on_aadhar = Some(identity.name);
                        next.form.aadhar_no = Some(identity.aadhaar_number);

                        if !matched {
                            fail_aadhaar(&mut next, FailureReason::NameMismatch);
                            return Ok(KycTransition::to(next));
                        }

                        next.aadhaar_verified = true;
                        next.aadhaar_phase = AadhaarPhase::Completed;
                        next.form.aadhar_verification_step_1 = true;
                        next.form.aadhar_failure_reason = None;
                        Ok(KycTransition::with(
                            next,
                            vec![
                                KycAction::MarkItemVerified,
                                KycAction::ScheduleCloseAndReset,
                            ],
                        ))
                    }
                }
            }

            KycEvent::AadhaarWaitTimedOut => {
                if !state.is_awaiting_aadhaar() {
                    return Err(KycError::NotAwaitingAadhaar);
                }
                fail_aadhaar(&mut next, FailureReason::TimedOut);
                Ok(KycTransition::to(next))
            }
        }
    }
}

fn require_step(state: &KycItemState, step: KycStep) -> Result<(), KycError> {
    if state.current_step == step {
        Ok(())
    } else {
        Err(KycError::StepLocked {
            current: state.current_step,
            attempted: step,
        })
    }
}

fn fail_aadhaar(state: &mut KycItemState, reason: FailureReason) {
    state.aadhaar_verified = false;
    state.aadhaar_phase = AadhaarPhase::Idle;
    state.form.aadhar_verification_step_1 = false;
    state.form.aadhar_failure_reason = Some(reason);
}
