use crate::thesis::{StageKind, ThesisRecord};
use serde::{Deserialize, Serialize};

/// Listing criteria. Empty search and no stage match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesisQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub stage: Option<StageKind>,
    /// Maximum number of items returned; `None` keeps every match.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ThesisQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_stage(mut self, stage: Option<StageKind>) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of a listing query, in original order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub items: Vec<ThesisRecord>,
    /// Matches before the limit was applied.
    pub total_matches: usize,
    pub truncated: bool,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
