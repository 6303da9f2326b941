//! File-backed backend.
//!
//! Implements the gateway traits in process: accounts with roles, opaque
//! tokens and the thesis records themselves, all run through [`Workflow`].
//! State lives in memory and, when opened on a path, in one JSON file
//! rewritten atomically after every change.

use crate::paths::ThesisPaths;
use crate::storage::AtomicFile;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thesis_core::gateway::{
    Acknowledgement, AuthGateway, DetailsUpdate, LoginRequest, LoginResponse, RegisterRequest,
    ThesisGateway, TransitionRequest,
};
use thesis_core::session::Session;
use thesis_core::thesis::{
    ActorRole, ThesisId, ThesisRecord, ThesisSubmission, Workflow, WorkflowPolicy,
};
use thesis_core::{Result, ThesisError};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    email: String,
    username: String,
    /// Name-based UUID of `username:password`. The local backend is not a security boundary.
    password_digest: String,
    role: ActorRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalState {
    #[serde(default)]
    accounts: Vec<Account>,
    /// token -> username
    #[serde(default)]
    tokens: BTreeMap<String, String>,
    #[serde(default)]
    theses: Vec<ThesisRecord>,
    #[serde(default)]
    next_id: u64,
}

impl LocalState {
    fn account_for(&self, session: &Session) -> Result<&Account> {
        let username = self
            .tokens
            .get(session.credential.expose())
            .ok_or_else(|| ThesisError::authorization("unknown or expired token"))?;
        self.accounts
            .iter()
            .find(|account| &account.username == username)
            .ok_or_else(|| ThesisError::authorization("account no longer exists"))
    }

    fn thesis_mut(&mut self, id: &ThesisId) -> Result<&mut ThesisRecord> {
        self.theses
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| ThesisError::not_found("thesis", id.as_str()))
    }
}

/// In-process backend enforcing the approval workflow.
pub struct LocalThesisBackend {
    state: Mutex<LocalState>,
    file: Option<AtomicFile<LocalState>>,
    workflow: Workflow,
}

impl LocalThesisBackend {
    /// Backend without persistence.
    pub fn in_memory(policy: WorkflowPolicy) -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            file: None,
            workflow: Workflow::new(policy),
        }
    }

    /// Backend persisted at `path`, loading whatever is already there.
    pub fn open(path: PathBuf, policy: WorkflowPolicy) -> Result<Self> {
        let file: AtomicFile<LocalState> = AtomicFile::json(path);
        let state = file.load()?.unwrap_or_default();
        debug!(
            "Opened local backend at {} ({} theses)",
            file.path().display(),
            state.theses.len()
        );
        Ok(Self {
            state: Mutex::new(state),
            file: Some(file),
            workflow: Workflow::new(policy),
        })
    }

    /// Backend at the default data location (`<data dir>/theses.json`).
    pub fn open_default(paths: &ThesisPaths, policy: WorkflowPolicy) -> Result<Self> {
        Self::open(paths.local_store_file()?, policy)
    }

    /// Runs `change` against the latest state and commits it only when it succeeds.
    ///
    /// File-backed state is reloaded and written under the file lock, so
    /// concurrent processes sharing the data directory do not lose updates.
    async fn mutate<R>(&self, change: impl FnOnce(&mut LocalState) -> Result<R>) -> Result<R> {
        let mut state = self.state.lock().await;
        match &self.file {
            Some(file) => file.update(state.clone(), |latest| {
                let result = change(latest)?;
                *state = latest.clone();
                Ok(result)
            }),
            None => {
                let mut draft = state.clone();
                let result = change(&mut draft)?;
                *state = draft;
                Ok(result)
            }
        }
    }

    /// Reads the latest state, first moving any defense that has passed into commission review.
    ///
    /// The advance is written through [`Self::mutate`], so it never races a concurrent change.
    async fn read<R>(&self, view: impl FnOnce(&LocalState) -> Result<R>) -> Result<R> {
        {
            let mut state = self.state.lock().await;
            if let Some(file) = &self.file
                && let Some(latest) = file.load()?
            {
                *state = latest;
            }
            let now = Utc::now();
            if !state
                .theses
                .iter()
                .any(|record| self.workflow.is_due(record, now))
            {
                return view(&*state);
            }
        }
        self.mutate(|state| {
            self.advance_all(state);
            view(state)
        })
        .await
    }

    fn advance_all(&self, state: &mut LocalState) {
        let now = Utc::now();
        for record in &mut state.theses {
            self.workflow.advance_due(record, now);
        }
    }
}

fn password_digest(username: &str, password: &str) -> String {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{username}:{password}").as_bytes(),
    )
    .to_string()
}

fn require_role(account: &Account, allowed: &[ActorRole], action: &str) -> Result<()> {
    if allowed.contains(&account.role) {
        return Ok(());
    }
    Err(ThesisError::authorization(format!(
        "{action} is not available to the {} role",
        account.role
    )))
}

#[async_trait]
impl AuthGateway for LocalThesisBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement> {
        for (field, value) in [
            ("email", &request.email),
            ("username", &request.username),
            ("password", &request.password),
        ] {
            if value.trim().is_empty() {
                return Err(ThesisError::validation(field, "is required"));
            }
        }

        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        let role = request.role.unwrap_or(ActorRole::Student);
        self.mutate(|state| {
            if state
                .accounts
                .iter()
                .any(|account| account.username == username || account.email == email)
            {
                return Err(ThesisError::validation(
                    "username",
                    "an account with this username or email already exists",
                ));
            }
            state.accounts.push(Account {
                password_digest: password_digest(&username, &request.password),
                email: email.clone(),
                username: username.clone(),
                role,
            });
            Ok(())
        })
        .await?;

        info!("Registered local account {username} ({role})");
        Ok(Acknowledgement::new(json!({
            "message": "Registered",
            "username": username,
            "role": role,
        })))
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let identifier = request.username_or_email.trim();
        let token = Uuid::new_v4().to_string();
        let account = self
            .mutate(|state| {
                let account = state
                    .accounts
                    .iter()
                    .find(|account| account.username == identifier || account.email == identifier)
                    .filter(|account| {
                        account.password_digest
                            == password_digest(&account.username, &request.password)
                    })
                    .cloned()
                    .ok_or_else(|| ThesisError::authorization("invalid username or password"))?;
                state.tokens.insert(token.clone(), account.username.clone());
                Ok(account)
            })
            .await?;

        debug!("Issued local token for {}", account.username);
        Ok(LoginResponse {
            token,
            username: Some(account.username),
            role: Some(account.role),
        })
    }
}

#[async_trait]
impl ThesisGateway for LocalThesisBackend {
    async fn submit_thesis(
        &self,
        session: &Session,
        submission: &ThesisSubmission,
    ) -> Result<Acknowledgement> {
        let record = self
            .mutate(|state| {
                require_role(state.account_for(session)?, &[ActorRole::Student], "submitThesis")?;
                let id = ThesisId::new((state.next_id + 1).to_string());
                let record = ThesisRecord::submit(id, submission.clone(), Utc::now())?;
                state.next_id += 1;
                state.theses.push(record.clone());
                Ok(record)
            })
            .await?;

        info!("Thesis {} submitted: {}", record.id, record.title);
        Ok(Acknowledgement::new(serde_json::to_value(&record)?))
    }

    async fn transition(
        &self,
        session: &Session,
        request: &TransitionRequest,
    ) -> Result<Acknowledgement> {
        let now = Utc::now();
        let (record, outcome) = self
            .mutate(|state| {
                let role = state.account_for(session)?.role;
                let record = state.thesis_mut(&request.thesis_id)?;
                self.workflow.advance_due(record, now);
                if let Some(expected) = request.expected_stage
                    && expected != record.stage()
                {
                    return Err(ThesisError::conflict(
                        expected.to_string(),
                        record.stage().to_string(),
                    ));
                }
                let outcome =
                    self.workflow
                        .apply(record, role, request.transition.clone(), now)?;
                Ok((record.clone(), outcome))
            })
            .await?;

        info!(
            "{} on thesis {}: {} -> {}",
            request.transition.action_name(),
            request.thesis_id,
            outcome.from,
            outcome.to
        );
        Ok(Acknowledgement::new(serde_json::to_value(&record)?))
    }

    async fn update_details(
        &self,
        session: &Session,
        update: &DetailsUpdate,
    ) -> Result<Acknowledgement> {
        let record = self
            .mutate(|state| {
                require_role(
                    state.account_for(session)?,
                    &[ActorRole::Student, ActorRole::Mentor],
                    "updateDetails",
                )?;
                let record = state.thesis_mut(&update.thesis_id)?;
                record.edit_details(
                    update.title.as_str(),
                    update.description.as_str(),
                    update.department.as_str(),
                )?;
                Ok(record.clone())
            })
            .await?;

        Ok(Acknowledgement::new(serde_json::to_value(&record)?))
    }

    async fn list_theses(&self, session: &Session) -> Result<Vec<ThesisRecord>> {
        self.read(|state| {
            state.account_for(session)?;
            Ok(state.theses.clone())
        })
        .await
    }

    async fn fetch_thesis(&self, session: &Session, id: &ThesisId) -> Result<ThesisRecord> {
        self.read(|state| {
            state.account_for(session)?;
            state
                .theses
                .iter()
                .find(|record| &record.id == id)
                .cloned()
                .ok_or_else(|| ThesisError::not_found("thesis", id.as_str()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use thesis_core::session::Credential;
    use thesis_core::thesis::{Decision, SecretaryPhase, Stage, Transition};

    fn submission() -> ThesisSubmission {
        ThesisSubmission {
            title: "X".to_string(),
            description: "d".to_string(),
            student_name: "A".to_string(),
            mentor_name: "B".to_string(),
            department: "CS".to_string(),
        }
    }

    async fn session_for(backend: &LocalThesisBackend, username: &str, role: ActorRole) -> Session {
        backend
            .register(&RegisterRequest {
                email: format!("{username}@uni.example"),
                username: username.to_string(),
                password: "pw".to_string(),
                role: Some(role),
            })
            .await
            .unwrap();
        let response = backend
            .login(&LoginRequest {
                username_or_email: username.to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        Session::verified(username, response.role, Credential::new(response.token))
    }

    fn mentor_approves() -> Transition {
        Transition::MentorDecision {
            decision: Decision::Approved,
            comments: "ok".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        session_for(&backend, "alice", ActorRole::Student).await;

        let err = backend
            .login(&LoginRequest {
                username_or_email: "alice@uni.example".to_string(),
                password: "nope".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        session_for(&backend, "alice", ActorRole::Student).await;

        let err = backend
            .register(&RegisterRequest {
                email: "other@uni.example".to_string(),
                username: "alice".to_string(),
                password: "pw".to_string(),
                role: None,
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_unknown_token_is_authorization_error() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        let forged = Session::verified("mallory", None, Credential::new("forged"));
        let err = backend.list_theses(&forged).await.unwrap_err();
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn test_submit_and_mentor_approval() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        let student = session_for(&backend, "alice", ActorRole::Student).await;
        let mentor = session_for(&backend, "bob", ActorRole::Mentor).await;

        // Only students submit.
        assert!(backend
            .submit_thesis(&mentor, &submission())
            .await
            .unwrap_err()
            .is_authorization());

        let ack = backend.submit_thesis(&student, &submission()).await.unwrap();
        let record = ack.record().unwrap();
        assert_eq!(record.id.as_str(), "1");
        assert_eq!(record.stage(), Stage::Submitted);

        // The student cannot validate.
        let err = backend
            .transition(
                &student,
                &TransitionRequest::new(record.id.clone(), mentor_approves()),
            )
            .await
            .unwrap_err();
        assert!(err.is_authorization());

        let ack = backend
            .transition(
                &mentor,
                &TransitionRequest::new(record.id.clone(), mentor_approves())
                    .expecting(Stage::Submitted),
            )
            .await
            .unwrap();
        assert_eq!(
            ack.record().unwrap().stage(),
            Stage::SecretaryReview {
                phase: SecretaryPhase::First
            }
        );
    }

    #[tokio::test]
    async fn test_stale_expected_stage_conflicts() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        let student = session_for(&backend, "alice", ActorRole::Student).await;
        let mentor = session_for(&backend, "bob", ActorRole::Mentor).await;
        let id = backend
            .submit_thesis(&student, &submission())
            .await
            .unwrap()
            .record()
            .unwrap()
            .id;

        let err = backend
            .transition(
                &mentor,
                &TransitionRequest::new(id.clone(), mentor_approves())
                    .expecting(Stage::MentorReview),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ThesisError::conflict("mentor-review", "submitted"));

        let record = backend.fetch_thesis(&mentor, &id).await.unwrap();
        assert!(record.validation_history().is_empty());
    }

    #[tokio::test]
    async fn test_details_edit_before_validation_only() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        let student = session_for(&backend, "alice", ActorRole::Student).await;
        let mentor = session_for(&backend, "bob", ActorRole::Mentor).await;
        let id = backend
            .submit_thesis(&student, &submission())
            .await
            .unwrap()
            .record()
            .unwrap()
            .id;

        let update = DetailsUpdate {
            thesis_id: id.clone(),
            title: "Better title".to_string(),
            description: "d".to_string(),
            department: "CS".to_string(),
        };
        backend.update_details(&student, &update).await.unwrap();
        assert_eq!(
            backend.fetch_thesis(&student, &id).await.unwrap().title,
            "Better title"
        );

        backend
            .transition(&mentor, &TransitionRequest::new(id, mentor_approves()))
            .await
            .unwrap();
        assert!(backend
            .update_details(&student, &update)
            .await
            .unwrap_err()
            .is_conflict());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ThesisPaths::with_base(temp_dir.path());

        let token = {
            let backend =
                LocalThesisBackend::open_default(&paths, WorkflowPolicy::default()).unwrap();
            let student = session_for(&backend, "alice", ActorRole::Student).await;
            backend.submit_thesis(&student, &submission()).await.unwrap();
            student.credential
        };

        let backend = LocalThesisBackend::open_default(&paths, WorkflowPolicy::default()).unwrap();
        let restored = Session::restored("alice", None, token);
        let theses = backend.list_theses(&restored).await.unwrap();
        assert_eq!(theses.len(), 1);
        assert_eq!(theses[0].title, "X");

        let student = session_for(&backend, "carol", ActorRole::Student).await;
        let ack = backend.submit_thesis(&student, &submission()).await.unwrap();
        assert_eq!(ack.record().unwrap().id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_missing_thesis_is_not_found() {
        let backend = LocalThesisBackend::in_memory(WorkflowPolicy::default());
        let mentor = session_for(&backend, "bob", ActorRole::Mentor).await;
        let err = backend
            .fetch_thesis(&mentor, &ThesisId::new("404"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_backends_sharing_a_file_keep_each_others_writes() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ThesisPaths::with_base(temp_dir.path());
        let first = LocalThesisBackend::open_default(&paths, WorkflowPolicy::default()).unwrap();
        let second = LocalThesisBackend::open_default(&paths, WorkflowPolicy::default()).unwrap();

        let alice = session_for(&first, "alice", ActorRole::Student).await;
        let carol = session_for(&second, "carol", ActorRole::Student).await;

        first.submit_thesis(&alice, &submission()).await.unwrap();
        // Lists through the second backend, whose cached state is stale.
        assert_eq!(second.list_theses(&carol).await.unwrap().len(), 1);
        second.submit_thesis(&carol, &submission()).await.unwrap();
        first.submit_thesis(&alice, &submission()).await.unwrap();

        let ids: Vec<String> = first
            .list_theses(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.id.to_string())
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }
}
