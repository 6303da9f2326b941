use crate::thesis::{ActorRole, Stage, ThesisId, ThesisRecord, Transition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ActorRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Login answer. Only `token` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ActorRole>,
}

/// One transition against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub thesis_id: ThesisId,
    /// Stage the caller believes the record is in; a mismatch is a conflict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_stage: Option<Stage>,
    pub transition: Transition,
}

impl TransitionRequest {
    pub fn new(thesis_id: ThesisId, transition: Transition) -> Self {
        Self {
            thesis_id,
            expected_stage: None,
            transition,
        }
    }

    pub fn expecting(mut self, stage: Stage) -> Self {
        self.expected_stage = Some(stage);
        self
    }
}

/// Descriptive fields editable before the first validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsUpdate {
    pub thesis_id: ThesisId,
    pub title: String,
    pub description: String,
    pub department: String,
}

/// Backend-defined success body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acknowledgement {
    pub body: serde_json::Value,
}

impl Acknowledgement {
    pub fn new(body: serde_json::Value) -> Self {
        Self { body }
    }

    /// The record carried by the body, when the backend returned one.
    pub fn record(&self) -> Option<ThesisRecord> {
        serde_json::from_value(self.body.clone()).ok()
    }

    /// Message text, when the backend returned one.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(|value| value.as_str())
    }
}
