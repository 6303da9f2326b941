//! Thesis use case: submission, validation and scheduling.
//!
//! Every action is checked locally first (required fields, role/decision
//! pairing, the caller's own role when known) so obviously invalid requests
//! never reach the backend. The backend stays the authority on stage.

use crate::form::FormState;
use crate::session_usecase::SessionUseCase;
use std::sync::Arc;
use thesis_core::gateway::{Acknowledgement, DetailsUpdate, ThesisGateway, TransitionRequest};
use thesis_core::session::Session;
use thesis_core::thesis::{ThesisId, ThesisRecord, ThesisSubmission};
use thesis_core::{Result, ThesisError};
use tracing::{debug, warn};

pub struct ThesisUseCase {
    gateway: Arc<dyn ThesisGateway>,
    sessions: Arc<SessionUseCase>,
}

impl ThesisUseCase {
    pub fn new(gateway: Arc<dyn ThesisGateway>, sessions: Arc<SessionUseCase>) -> Self {
        Self { gateway, sessions }
    }

    pub async fn submit(&self, submission: &ThesisSubmission) -> Result<Acknowledgement> {
        submission.validate()?;
        let session = self.sessions.require().await?;

        let outcome = self.gateway.submit_thesis(&session, submission).await;
        self.sessions.observe(&outcome).await?;
        outcome
    }

    /// Submits the values held by `form`, clearing them only on success.
    pub async fn submit_form(&self, form: &FormState<ThesisSubmission>) -> Result<Acknowledgement> {
        form.submit(|submission| async move { self.submit(&submission).await })
            .await
    }

    /// Requests one workflow transition.
    ///
    /// A conflict is returned as is; the caller re-fetches and retries deliberately.
    pub async fn apply(&self, request: &TransitionRequest) -> Result<Acknowledgement> {
        request.transition.check_payload()?;
        let session = self.sessions.require().await?;
        check_role(&session, request)?;

        debug!(
            "Dispatching {} on thesis {}",
            request.transition.action_name(),
            request.thesis_id
        );
        let outcome = self.gateway.transition(&session, request).await;
        if let Err(err) = &outcome
            && err.is_conflict()
        {
            warn!(
                "{} on thesis {} conflicted: {err}",
                request.transition.action_name(),
                request.thesis_id
            );
        }
        self.sessions.observe(&outcome).await?;
        outcome
    }

    pub async fn update_details(&self, update: &DetailsUpdate) -> Result<Acknowledgement> {
        for (field, value) in [
            ("title", &update.title),
            ("description", &update.description),
            ("department", &update.department),
        ] {
            if value.trim().is_empty() {
                return Err(ThesisError::validation(field, "is required"));
            }
        }
        let session = self.sessions.require().await?;

        let outcome = self.gateway.update_details(&session, update).await;
        self.sessions.observe(&outcome).await?;
        outcome
    }

    pub async fn fetch(&self, id: &ThesisId) -> Result<ThesisRecord> {
        let session = self.sessions.require().await?;

        let outcome = self.gateway.fetch_thesis(&session, id).await;
        self.sessions.observe(&outcome).await?;
        outcome
    }
}

/// Refuses locally when the session's role is known and is not the one required.
fn check_role(session: &Session, request: &TransitionRequest) -> Result<()> {
    let required = request.transition.required_role();
    match session.role {
        Some(role) if role != required => Err(ThesisError::authorization(format!(
            "{} requires the {required} role, signed in as {role}",
            request.transition.action_name()
        ))),
        _ => Ok(()),
    }
}
