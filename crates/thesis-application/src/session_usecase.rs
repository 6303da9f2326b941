//! Session use case: the authentication holder.
//!
//! Owns the process-wide [`Session`] and its persisted credential. Login is
//! the only way to create a verified session; a session restored from storage
//! stays unverified until an authorized call succeeds, and is discarded when
//! the backend rejects its credential.

use std::sync::Arc;
use thesis_core::gateway::{Acknowledgement, AuthGateway, LoginRequest, RegisterRequest};
use thesis_core::session::{Credential, CredentialStore, Session, StoredCredential};
use thesis_core::thesis::ActorRole;
use thesis_core::{Result, ThesisError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct SessionUseCase {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn CredentialStore>,
    session: RwLock<Option<Session>>,
}

impl SessionUseCase {
    pub fn new(auth: Arc<dyn AuthGateway>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth,
            store,
            session: RwLock::new(None),
        }
    }

    /// Logs in and persists the credential.
    ///
    /// On failure the current session and stored credential are left as they were.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Session> {
        require("usernameOrEmail", identifier)?;
        require("password", password)?;

        let response = self
            .auth
            .login(&LoginRequest {
                username_or_email: identifier.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let credential = Credential::new(response.token);
        if credential.is_blank() {
            return Err(ThesisError::authorization("login response carried an empty token"));
        }
        let identity = response
            .username
            .unwrap_or_else(|| identifier.trim().to_string());

        self.store
            .save(&StoredCredential {
                token: credential.clone(),
                identity: Some(identity.clone()),
                role: response.role,
            })
            .await?;

        let session = Session::verified(identity, response.role, credential);
        *self.session.write().await = Some(session.clone());
        info!("Logged in as {}", session.identity);
        Ok(session)
    }

    /// Creates an account. Does not log in.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        role: Option<ActorRole>,
    ) -> Result<Acknowledgement> {
        require("email", email)?;
        require("username", username)?;
        require("password", password)?;

        let ack = self
            .auth
            .register(&RegisterRequest {
                email: email.trim().to_string(),
                username: username.trim().to_string(),
                password: password.to_string(),
                role,
            })
            .await?;
        info!("Registered {}", username.trim());
        Ok(ack)
    }

    /// Clears the session and the stored credential. Safe to call repeatedly.
    pub async fn logout(&self) -> Result<()> {
        let previous = self.session.write().await.take();
        self.store.clear().await?;
        if let Some(session) = previous {
            info!("Logged out {}", session.identity);
        }
        Ok(())
    }

    /// Populates the session from the stored credential, unverified.
    pub async fn restore(&self) -> Result<Option<Session>> {
        let Some(stored) = self.store.load().await? else {
            debug!("No stored credential");
            return Ok(None);
        };

        let session = Session::restored(
            stored.identity.unwrap_or_default(),
            stored.role,
            stored.token,
        );
        *self.session.write().await = Some(session.clone());
        debug!("Restored unverified session for {}", session.identity);
        Ok(Some(session))
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The current session, or an authorization error when logged out.
    pub async fn require(&self) -> Result<Session> {
        self.current()
            .await
            .ok_or_else(|| ThesisError::authorization("not logged in"))
    }

    /// Feeds the result of an authorized call back into the session state.
    ///
    /// Success verifies a restored session; an authorization failure on an
    /// unverified session discards it along with the stored credential.
    pub async fn observe<T>(&self, outcome: &Result<T>) -> Result<()> {
        let mut guard = self.session.write().await;
        let Some(session) = guard.as_mut() else {
            return Ok(());
        };

        match outcome {
            Ok(_) if !session.is_verified() => {
                session.mark_verified();
                debug!("Session for {} verified", session.identity);
            }
            Err(err) if err.is_authorization() && !session.is_verified() => {
                warn!(
                    "Stored credential for {} was rejected; discarding it",
                    session.identity
                );
                *guard = None;
                drop(guard);
                self.store.clear().await?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ThesisError::validation(field, "is required"));
    }
    Ok(())
}
