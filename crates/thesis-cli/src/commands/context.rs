//! Wiring of use cases for one CLI invocation.

use anyhow::{Context, Result};
use std::sync::Arc;
use thesis_application::{ListingUseCase, SessionUseCase, ThesisUseCase};
use thesis_core::config::{BackendKind, ClientConfig};
use thesis_core::gateway::{AuthGateway, ThesisGateway};
use thesis_infrastructure::{ApiClient, FileCredentialStore, HttpGateway, LocalThesisBackend, ThesisPaths};
use tracing::debug;

pub struct Desk {
    pub sessions: Arc<SessionUseCase>,
    pub theses: ThesisUseCase,
    pub listing: ListingUseCase,
}

impl Desk {
    /// Builds the use cases for the configured backend and restores any stored session.
    pub async fn open(paths: &ThesisPaths, config: &ClientConfig) -> Result<Self> {
        let (auth, gateway): (Arc<dyn AuthGateway>, Arc<dyn ThesisGateway>) =
            match config.backend.kind {
                BackendKind::Remote => {
                    let client = ApiClient::from_config(&config.api)?;
                    debug!("Using remote backend at {}", client.base_url());
                    let http = Arc::new(HttpGateway::new(client));
                    let auth: Arc<dyn AuthGateway> = http.clone();
                    let gateway: Arc<dyn ThesisGateway> = http;
                    (auth, gateway)
                }
                BackendKind::Local => {
                    let local = Arc::new(
                        LocalThesisBackend::open_default(paths, config.workflow)
                            .context("Failed to open the local backend")?,
                    );
                    let auth: Arc<dyn AuthGateway> = local.clone();
                    let gateway: Arc<dyn ThesisGateway> = local;
                    (auth, gateway)
                }
            };

        let store = Arc::new(FileCredentialStore::new(paths)?);
        let sessions = Arc::new(SessionUseCase::new(auth, store));
        sessions
            .restore()
            .await
            .context("Failed to read the stored credential")?;

        Ok(Self {
            theses: ThesisUseCase::new(gateway.clone(), sessions.clone()),
            listing: ListingUseCase::new(gateway, sessions.clone(), config.listing.max_results),
            sessions,
        })
    }
}
