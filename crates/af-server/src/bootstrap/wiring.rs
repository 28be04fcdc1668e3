//! # Dependency Injection
//!
//! The only place that sees `af-app`, `af-infra` and the relay at once. It
//! assembles; it does not decide anything the config has not already decided.

use std::sync::Arc;

use af_app::{AppDeps, AppStore, AppUseCases};
use af_core::config::{AppConfig, VerificationTransport};
use af_core::ports::*;
use af_infra::{
    message_channel, FileStatePersistence, HttpBackendApi, HttpKycServices,
    InMemoryVerificationStore, NoopStatePersistence, PollingSource, SystemClock,
    WindowMessageSender,
};
use tracing::info;

use crate::adapters::TracingKycDialog;
use crate::relay::RelayState;

pub type WiringResult<T> = Result<T, WiringError>;

#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Backend client initialization failed: {0}")]
    BackendInit(String),

    #[error("KYC services client initialization failed: {0}")]
    KycServicesInit(String),

    #[error("Verification transport initialization failed: {0}")]
    VerificationInit(String),
}

/// Everything a running storefront process needs.
pub struct Wired {
    pub usecases: AppUseCases,
    pub relay: RelayState,
    /// Set when results arrive as window messages; whatever hosts the
    /// DigiLocker popup forwards its messages here.
    pub window_messages: Option<WindowMessageSender>,
}

const WINDOW_MESSAGE_CAPACITY: usize = 16;

fn create_persistence(config: &AppConfig) -> Arc<dyn StatePersistencePort> {
    match &config.storage.state_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Persisting client state to disk");
            Arc::new(FileStatePersistence::new(dir.clone()))
        }
        None => {
            info!("No state dir configured, client state is kept in memory");
            Arc::new(NoopStatePersistence)
        }
    }
}

fn create_verification_source(
    config: &AppConfig,
) -> WiringResult<(Arc<dyn VerificationResultSource>, Option<WindowMessageSender>)> {
    match config.verification.transport {
        VerificationTransport::Polling => {
            let source = PollingSource::from_config(&config.relay, &config.verification)
                .map_err(|e| WiringError::VerificationInit(format!("{e:#}")))?;
            Ok((Arc::new(source), None))
        }
        VerificationTransport::Message => {
            let origin = config
                .verification
                .allowed_origin
                .clone()
                .unwrap_or_else(|| config.relay.public_base_url.clone());
            let (sender, source) = message_channel(origin, WINDOW_MESSAGE_CAPACITY);
            Ok((Arc::new(source), Some(sender)))
        }
    }
}

/// Builds the store, the adapters and the relay state from `config`.
///
/// Persisted client state is loaded before the use cases are handed out.
pub async fn wire_dependencies(config: &AppConfig) -> WiringResult<Wired> {
    let store = Arc::new(AppStore::new(create_persistence(config)));
    store.hydrate().await;

    let backend = Arc::new(
        HttpBackendApi::new(&config.api, store.clone())
            .map_err(|e| WiringError::BackendInit(format!("{e:#}")))?,
    );
    let kyc_services = Arc::new(
        HttpKycServices::new(&config.kyc_services)
            .map_err(|e| WiringError::KycServicesInit(format!("{e:#}")))?,
    );
    let (verification_results, window_messages) = create_verification_source(config)?;

    let relay = RelayState::new(
        Arc::new(InMemoryVerificationStore::new()),
        kyc_services.clone(),
    );

    let deps = AppDeps {
        // Remote collaborators
        backend,
        pan_lookup: kyc_services.clone(),
        digilocker: kyc_services,

        verification_results,
        kyc_dialog: Arc::new(TracingKycDialog),

        // System
        clock: Arc::new(SystemClock),
        store,
        config: config.clone(),
    };

    Ok(Wired {
        usecases: AppUseCases::new(deps),
        relay,
        window_messages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiring_error_display() {
        let err = WiringError::BackendInit("tls unavailable".to_string());
        assert!(err.to_string().contains("Backend client initialization"));
        assert!(err.to_string().contains("tls unavailable"));
    }

    #[tokio::test]
    async fn polling_transport_has_no_message_sender() {
        let wired = wire_dependencies(&AppConfig::default()).await.unwrap();
        assert!(wired.window_messages.is_none());
        assert_eq!(wired.usecases.config().relay.port, 3000);
    }

    #[tokio::test]
    async fn message_transport_exposes_sender_and_state_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.verification.transport = VerificationTransport::Message;
        config.storage.state_dir = Some(dir.path().to_path_buf());

        let wired = wire_dependencies(&config).await.unwrap();
        assert!(wired.window_messages.is_some());

        wired
            .usecases
            .toggle_watchlist()
            .execute(&af_core::ItemId::from("5"))
            .await;
        assert!(dir.path().join("activity.json").exists());
    }
}
