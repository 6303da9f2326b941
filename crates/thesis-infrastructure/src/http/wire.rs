//! Endpoint paths and request bodies of the remote API.
//!
//! Bodies are flat camelCase objects keyed by `thesisId`. A transition request
//! that carries an expected stage sends it as `expectedStage`.

use serde_json::{json, Map, Value};
use thesis_core::gateway::{DetailsUpdate, TransitionRequest};
use thesis_core::thesis::{SecretaryPhase, ThesisId, Transition};
use thesis_core::Result;

pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const SUBMIT_THESIS: &str = "/student/master-thesis/submit-thesis";
pub const THESES: &str = "/master-thesis";

const MENTOR: &str = "/mentor/master-thesis";
const ADMINISTRATION: &str = "/administration/master-thesis";

/// Path of a single record. Ids that are not a plain path segment are refused.
pub fn thesis_path(id: &ThesisId) -> Result<String> {
    Ok(format!("{THESES}/{}", id.path_segment()?))
}

/// Path of the secretary endpoint for one sub-phase.
pub fn secretary_path(phase: SecretaryPhase) -> String {
    let endpoint = match phase {
        SecretaryPhase::First => "validate-by-secretary",
        SecretaryPhase::Second => "validate-second-secretary-phase",
        SecretaryPhase::Third => "validate-third-secretary-phase",
        SecretaryPhase::Fourth => "validate-fourth-secretary-phase",
    };
    format!("{ADMINISTRATION}/{endpoint}")
}

/// A ready-to-send POST.
#[derive(Debug, Clone, PartialEq)]
pub struct WireCall {
    pub path: String,
    pub body: Value,
}

/// Maps a transition request onto its endpoint and body.
pub fn transition_call(request: &TransitionRequest) -> Result<WireCall> {
    let (path, fields) = match &request.transition {
        Transition::MentorDecision { decision, comments } => (
            format!("{MENTOR}/validate-by-mentor"),
            json!({ "validationType": decision, "comments": comments }),
        ),
        Transition::SecretaryDecision {
            phase,
            decision,
            comments,
        } => (
            secretary_path(*phase),
            json!({ "phase": phase, "decision": decision, "comments": comments }),
        ),
        Transition::AdministrationDecision { decision, comments } => (
            format!("{ADMINISTRATION}/validate-by-administration"),
            json!({ "decision": decision, "comments": comments }),
        ),
        Transition::CommissionDecision { decision, comments } => (
            format!("{ADMINISTRATION}/validate-by-commission"),
            json!({ "decision": decision, "comments": comments }),
        ),
        Transition::AssignCommission { members } => (
            format!("{MENTOR}/select-commission-members"),
            json!({ "members": members }),
        ),
        Transition::ScheduleDefense(schedule) => (
            format!("{MENTOR}/schedule-defense"),
            serde_json::to_value(schedule)?,
        ),
        Transition::SubmitCommissionReport(report) => (
            format!("{MENTOR}/submit-commission-report"),
            serde_json::to_value(report)?,
        ),
        Transition::UploadDocument(document) => (
            format!("{MENTOR}/upload-thesis"),
            serde_json::to_value(document)?,
        ),
        Transition::UploadRevision(document) => (
            format!("{MENTOR}/upload-revised-thesis"),
            serde_json::to_value(document)?,
        ),
        Transition::MarkDefended => (format!("{MENTOR}/mark-thesis"), json!({})),
        Transition::Archive => (format!("{ADMINISTRATION}/archive-thesis"), json!({})),
    };

    let mut body = Map::new();
    body.insert("thesisId".to_string(), serde_json::to_value(&request.thesis_id)?);
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    if let Some(stage) = &request.expected_stage {
        body.insert("expectedStage".to_string(), serde_json::to_value(stage)?);
    }

    Ok(WireCall {
        path,
        body: Value::Object(body),
    })
}

/// Maps a details edit onto its endpoint and body (sent with PUT).
pub fn details_call(update: &DetailsUpdate) -> Result<WireCall> {
    Ok(WireCall {
        path: thesis_path(&update.thesis_id)?,
        body: serde_json::to_value(update)?,
    })
}
