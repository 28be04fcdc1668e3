use std::time::Duration;

use af_core::config::{RelayConfig, VerificationConfig};
use af_core::ports::{VerificationResultSource, VerificationWaitError};
use af_core::verification::StatusResponse;
use af_core::{AadhaarOutcome, UserId};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Polls the relay's status endpoint until a record for the user appears.
///
/// The relay hands a record out once, so the first `verified: true` answer
/// is the result. A failed poll is logged and the next one still runs; the
/// wait is bounded by `max_attempts` alone.
pub struct PollingSource {
    client: Client,
    status_url: String,
    interval: Duration,
    max_attempts: u32,
}

impl PollingSource {
    pub fn new(
        status_url: impl Into<String>,
        interval: Duration,
        max_attempts: u32,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build polling http client failed")?;
        Ok(Self {
            client,
            status_url: status_url.into(),
            interval,
            max_attempts,
        })
    }

    pub fn from_config(relay: &RelayConfig, verification: &VerificationConfig) -> anyhow::Result<Self> {
        Self::new(
            relay.status_url(),
            Duration::from_secs(verification.poll_interval_secs),
            verification.max_poll_attempts,
        )
    }

    async fn poll_once(&self, user_id: &UserId) -> anyhow::Result<Option<AadhaarOutcome>> {
        let response = self
            .client
            .get(&self.status_url)
            .query(&[("user_id", user_id.as_str())])
            .send()
            .await
            .context("status request failed")?
            .error_for_status()
            .context("status endpoint returned an error")?;
        let status: StatusResponse = response.json().await.context("decode status failed")?;

        Ok(match status.aadhaar_data {
            Some(record) if status.verified => Some(AadhaarOutcome::from_status_record(&record)),
            _ => None,
        })
    }
}

#[async_trait]
impl VerificationResultSource for PollingSource {
    async fn await_result(&self, user_id: &UserId) -> Result<AadhaarOutcome, VerificationWaitError> {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;
            match self.poll_once(user_id).await {
                Ok(Some(outcome)) => {
                    info!(user_id = %user_id, attempt, "Verification record received");
                    return Ok(outcome);
                }
                Ok(None) => debug!(user_id = %user_id, attempt, "No verification record yet"),
                Err(err) => warn!(user_id = %user_id, attempt, error = %format!("{err:#}"), "Status poll failed"),
            }
        }
        Err(VerificationWaitError::TimedOut {
            attempts: self.max_attempts,
        })
    }
}
