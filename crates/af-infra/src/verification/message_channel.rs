use af_core::ports::{VerificationResultSource, VerificationWaitError};
use af_core::verification::{VerificationMessage, WindowMessage};
use af_core::{AadhaarOutcome, UserId};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Creates a connected sender/source pair. `allowed_origin` is the only
/// origin whose messages are accepted.
///
/// Messages reach only the waits that are active when they are posted; a
/// message posted while nobody waits is dropped.
pub fn message_channel(
    allowed_origin: impl Into<String>,
    capacity: usize,
) -> (WindowMessageSender, MessageChannelSource) {
    let (tx, _) = broadcast::channel(capacity.max(1));
    (
        WindowMessageSender { tx: tx.clone() },
        MessageChannelSource {
            allowed_origin: allowed_origin.into(),
            tx,
        },
    )
}

/// Handle through which whatever hosts the popup forwards window messages.
#[derive(Clone)]
pub struct WindowMessageSender {
    tx: broadcast::Sender<WindowMessage>,
}

impl WindowMessageSender {
    /// Returns `false` when no wait is active and the message was dropped.
    pub fn post(&self, message: WindowMessage) -> bool {
        match self.tx.send(message) {
            Ok(_) => true,
            Err(_) => {
                debug!("Window message dropped, nobody is waiting");
                false
            }
        }
    }

    /// Number of waits currently listening.
    pub fn active_waiters(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Yields the first valid verification result posted after the wait began.
pub struct MessageChannelSource {
    allowed_origin: String,
    tx: broadcast::Sender<WindowMessage>,
}

#[async_trait]
impl VerificationResultSource for MessageChannelSource {
    async fn await_result(&self, user_id: &UserId) -> Result<AadhaarOutcome, VerificationWaitError> {
        let mut rx = self.tx.subscribe();
        loop {
            let message = match rx.recv().await {
                Ok(message) => message,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user_id = %user_id, skipped, "Window messages lagged");
                    continue;
                }
                Err(RecvError::Closed) => return Err(VerificationWaitError::Closed),
            };
            match VerificationMessage::parse(&message, &self.allowed_origin) {
                Some(valid) => {
                    info!(user_id = %user_id, "Received Aadhaar verification message");
                    return Ok(valid.outcome);
                }
                None => debug!(origin = %message.origin, "Skipping window message"),
            }
        }
    }
}
