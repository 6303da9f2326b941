//! Gateway implementation over the remote REST API.

use crate::http::client::ApiClient;
use crate::http::wire;
use async_trait::async_trait;
use thesis_core::gateway::{
    Acknowledgement, AuthGateway, DetailsUpdate, LoginRequest, LoginResponse, RegisterRequest,
    ThesisGateway, TransitionRequest,
};
use thesis_core::session::Session;
use thesis_core::thesis::{ThesisId, ThesisRecord, ThesisSubmission};
use thesis_core::Result;
use tracing::debug;

/// [`AuthGateway`] and [`ThesisGateway`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: ApiClient,
}

impl HttpGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn register(&self, request: &RegisterRequest) -> Result<Acknowledgement> {
        debug!("POST {} for {}", wire::REGISTER, request.username);
        let body = self.client.post(wire::REGISTER, request, None).await?;
        Ok(Acknowledgement::new(body))
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        debug!("POST {} for {}", wire::LOGIN, request.username_or_email);
        let body = self.client.post(wire::LOGIN, request, None).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl ThesisGateway for HttpGateway {
    async fn submit_thesis(
        &self,
        session: &Session,
        submission: &ThesisSubmission,
    ) -> Result<Acknowledgement> {
        debug!("POST {}", wire::SUBMIT_THESIS);
        let body = self
            .client
            .post(wire::SUBMIT_THESIS, submission, Some(&session.credential))
            .await?;
        Ok(Acknowledgement::new(body))
    }

    async fn transition(
        &self,
        session: &Session,
        request: &TransitionRequest,
    ) -> Result<Acknowledgement> {
        let call = wire::transition_call(request)?;
        debug!(
            "POST {} ({} on {})",
            call.path,
            request.transition.action_name(),
            request.thesis_id
        );
        let body = self
            .client
            .post(&call.path, &call.body, Some(&session.credential))
            .await?;
        Ok(Acknowledgement::new(body))
    }

    async fn update_details(
        &self,
        session: &Session,
        update: &DetailsUpdate,
    ) -> Result<Acknowledgement> {
        let call = wire::details_call(update)?;
        debug!("PUT {}", call.path);
        let body = self
            .client
            .put(&call.path, &call.body, Some(&session.credential))
            .await?;
        Ok(Acknowledgement::new(body))
    }

    async fn list_theses(&self, session: &Session) -> Result<Vec<ThesisRecord>> {
        debug!("GET {}", wire::THESES);
        let body = self
            .client
            .get(wire::THESES, Some(&session.credential))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn fetch_thesis(&self, session: &Session, id: &ThesisId) -> Result<ThesisRecord> {
        let path = wire::thesis_path(id)?;
        debug!("GET {path}");
        let body = self.client.get(&path, Some(&session.credential)).await?;
        Ok(serde_json::from_value(body)?)
    }
}
