//! Listing use case: fetch, then filter client-side.

use crate::session_usecase::SessionUseCase;
use std::sync::Arc;
use thesis_core::gateway::ThesisGateway;
use thesis_core::listing::{self, ListingPage, ThesisQuery};
use thesis_core::Result;
use tracing::debug;

pub struct ListingUseCase {
    gateway: Arc<dyn ThesisGateway>,
    sessions: Arc<SessionUseCase>,
    max_results: usize,
}

impl ListingUseCase {
    pub fn new(
        gateway: Arc<dyn ThesisGateway>,
        sessions: Arc<SessionUseCase>,
        max_results: usize,
    ) -> Self {
        Self {
            gateway,
            sessions,
            max_results,
        }
    }

    /// Fetches every visible record and applies `query`.
    ///
    /// The page never exceeds the configured maximum, whatever the query asks for.
    pub async fn list(&self, query: &ThesisQuery) -> Result<ListingPage> {
        let session = self.sessions.require().await?;

        let outcome = self.gateway.list_theses(&session).await;
        self.sessions.observe(&outcome).await?;
        let records = outcome?;

        let limit = query
            .limit
            .map_or(self.max_results, |limit| limit.min(self.max_results));
        let page = listing::select(
            &records,
            &ThesisQuery {
                limit: Some(limit),
                ..query.clone()
            },
        );
        debug!(
            "Listing: {} fetched, {} matched, {} shown",
            records.len(),
            page.total_matches,
            page.items.len()
        );
        Ok(page)
    }
}
