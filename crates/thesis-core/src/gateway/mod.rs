//! Gateway traits over the thesis backend.
//!
//! The remote REST API and the local file-backed backend both implement
//! these traits; use cases depend on nothing else.

mod request;

pub use request::{
    Acknowledgement, DetailsUpdate, LoginRequest, LoginResponse, RegisterRequest,
    TransitionRequest,
};

use crate::error::Result;
use crate::session::Session;
use crate::thesis::{ThesisId, ThesisRecord, ThesisSubmission};
use async_trait::async_trait;

/// Anonymous account operations.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Creates an account. Does not establish a session.
    async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement>;

    /// Exchanges credentials for a token.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;
}

/// Authenticated thesis operations. Every call carries the session explicitly.
#[async_trait]
pub trait ThesisGateway: Send + Sync {
    async fn submit_thesis(
        &self,
        session: &Session,
        submission: &ThesisSubmission,
    ) -> Result<Acknowledgement>;

    /// Requests one workflow transition.
    ///
    /// Fails with a conflict when the record is not in the targeted stage.
    async fn transition(
        &self,
        session: &Session,
        request: &TransitionRequest,
    ) -> Result<Acknowledgement>;

    async fn update_details(
        &self,
        session: &Session,
        update: &DetailsUpdate,
    ) -> Result<Acknowledgement>;

    async fn list_theses(&self, session: &Session) -> Result<Vec<ThesisRecord>>;

    async fn fetch_thesis(&self, session: &Session, id: &ThesisId) -> Result<ThesisRecord>;
}
