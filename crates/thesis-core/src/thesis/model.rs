//! Thesis domain model.
//!
//! This module contains the entities and value objects describing one thesis
//! under review: the record itself, the decisions recorded against it and the
//! defense it leads to.

use crate::error::{Result, ThesisError};
use crate::thesis::stage::{SecretaryPhase, Stage};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Accepted `date` format of a defense schedule.
pub const DEFENSE_DATE_FORMAT: &str = "%Y-%m-%d";
/// Accepted `time` format of a defense schedule.
pub const DEFENSE_TIME_FORMAT: &str = "%H:%M";

/// Backend-assigned thesis identifier.
///
/// Backends hand out either numeric or string ids; both deserialize into the
/// same opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ThesisId(String);

impl ThesisId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a single URL path segment.
    ///
    /// Only ASCII letters, digits, `-`, `_` and `.` are accepted, so the id
    /// cannot reach a different endpoint.
    pub fn path_segment(&self) -> Result<&str> {
        let safe = !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if safe {
            Ok(&self.0)
        } else {
            Err(ThesisError::validation(
                "thesisId",
                format!("'{}' is not a valid thesis id", self.0),
            ))
        }
    }
}

impl fmt::Display for ThesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ThesisId {
    type Err = ThesisError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ThesisError::validation("thesisId", "must not be empty"));
        }
        let id = Self(trimmed.to_string());
        id.path_segment()?;
        Ok(id)
    }
}

impl<'de> Deserialize<'de> for ThesisId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// Roles that can act on a thesis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActorRole {
    Student,
    Mentor,
    Secretary,
    Administration,
    Commission,
}

impl ActorRole {
    /// Decisions this role may record.
    pub fn allowed_decisions(self) -> &'static [Decision] {
        match self {
            Self::Student => &[],
            Self::Mentor => &[Decision::Approved, Decision::Rejected, Decision::NeedsRevision],
            Self::Secretary => &[Decision::Approved, Decision::Rejected],
            Self::Administration => &[Decision::Approved, Decision::Rejected, Decision::Pending],
            Self::Commission => &[Decision::Approved, Decision::Rejected, Decision::Conditional],
        }
    }

    pub fn may_decide(self, decision: Decision) -> bool {
        self.allowed_decisions().contains(&decision)
    }
}

/// Outcome recorded by a validation event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Decision {
    Approved,
    Rejected,
    NeedsRevision,
    Conditional,
    Pending,
}

/// One recorded decision by one actor role. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationEvent {
    pub actor_role: ActorRole,
    pub decision: Decision,
    pub comments: String,
    /// Secretary sub-phase the decision was recorded for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<SecretaryPhase>,
    pub timestamp: DateTime<Utc>,
}

/// Fields collected by the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisSubmission {
    pub title: String,
    pub description: String,
    pub student_name: String,
    pub mentor_name: String,
    pub department: String,
}

impl ThesisSubmission {
    /// Checks every field is present. Reports the first blank one.
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("studentName", &self.student_name)?;
        require("mentorName", &self.mentor_name)?;
        require("department", &self.department)?;
        Ok(())
    }
}

/// Defense scheduling payload.
///
/// No double-booking check happens client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseSchedule {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24h
    pub time: String,
    pub location: String,
    pub commission_members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DefenseSchedule {
    pub fn validate(&self) -> Result<()> {
        require("date", &self.date)?;
        require("time", &self.time)?;
        require("location", &self.location)?;
        require_members("commissionMembers", &self.commission_members)?;
        self.scheduled_at().map(|_| ())
    }

    /// Scheduled instant, reading date and time as UTC.
    pub fn scheduled_at(&self) -> Result<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DEFENSE_DATE_FORMAT)
            .map_err(|e| ThesisError::validation("date", format!("expected YYYY-MM-DD: {e}")))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), DEFENSE_TIME_FORMAT)
            .map_err(|e| ThesisError::validation("time", format!("expected HH:MM: {e}")))?;
        Ok(NaiveDateTime::new(date, time).and_utc())
    }
}

/// Commission report fields filed by the mentor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    pub report: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// Reference to an uploaded thesis document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisDocument {
    /// File name or URL of the uploaded document.
    pub document: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A commission report as stored on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiledReport {
    #[serde(flatten)]
    pub report: CommissionReport,
    pub filed_at: DateTime<Utc>,
}

/// A document as stored on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiledDocument {
    #[serde(flatten)]
    pub document: ThesisDocument,
    /// Uploaded as a resubmission.
    #[serde(default)]
    pub revision: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// One academic thesis under review.
///
/// `stage` and the collections it depends on are only changed through the
/// workflow; the history is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisRecord {
    pub id: ThesisId,
    pub title: String,
    pub description: String,
    pub department: String,
    pub student_name: String,
    pub mentor_name: String,
    pub submitted_date: DateTime<Utc>,
    #[serde(default)]
    pub(crate) stage: Stage,
    #[serde(default)]
    pub(crate) validation_history: Vec<ValidationEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) commission_members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) defense: Option<DefenseSchedule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) previous_defenses: Vec<DefenseSchedule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) reports: Vec<FiledReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) documents: Vec<FiledDocument>,
}

impl ThesisRecord {
    /// Creates a record in `Submitted` from a complete submission.
    pub fn submit(id: ThesisId, submission: ThesisSubmission, now: DateTime<Utc>) -> Result<Self> {
        submission.validate()?;
        Ok(Self {
            id,
            title: submission.title.trim().to_string(),
            description: submission.description.trim().to_string(),
            department: submission.department.trim().to_string(),
            student_name: submission.student_name.trim().to_string(),
            mentor_name: submission.mentor_name.trim().to_string(),
            submitted_date: now,
            stage: Stage::Submitted,
            validation_history: Vec::new(),
            commission_members: Vec::new(),
            defense: None,
            previous_defenses: Vec::new(),
            reports: Vec::new(),
            documents: Vec::new(),
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn validation_history(&self) -> &[ValidationEvent] {
        &self.validation_history
    }

    pub fn commission_members(&self) -> &[String] {
        &self.commission_members
    }

    pub fn defense(&self) -> Option<&DefenseSchedule> {
        self.defense.as_ref()
    }

    pub fn previous_defenses(&self) -> &[DefenseSchedule] {
        &self.previous_defenses
    }

    pub fn reports(&self) -> &[FiledReport] {
        &self.reports
    }

    pub fn documents(&self) -> &[FiledDocument] {
        &self.documents
    }

    /// Whether descriptive fields can still change: only before the first validation.
    pub fn is_editable(&self) -> bool {
        self.stage == Stage::Submitted && self.validation_history.is_empty()
    }

    /// Replaces title, description and department.
    pub fn edit_details(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        department: impl Into<String>,
    ) -> Result<()> {
        if !self.is_editable() {
            return Err(ThesisError::conflict(
                "submitted (not yet validated)",
                self.stage.to_string(),
            ));
        }
        let (title, description, department): (String, String, String) =
            (title.into(), description.into(), department.into());
        require("title", &title)?;
        require("description", &description)?;
        require("department", &department)?;
        self.title = title.trim().to_string();
        self.description = description.trim().to_string();
        self.department = department.trim().to_string();
        Ok(())
    }

    /// Number of trailing events recorded by `role` with `decision`.
    pub(crate) fn trailing_decisions(&self, role: ActorRole, decision: Decision) -> usize {
        self.validation_history
            .iter()
            .rev()
            .take_while(|event| event.actor_role == role && event.decision == decision)
            .count()
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ThesisError::validation(field, "is required"));
    }
    Ok(())
}

pub(crate) fn require_members(field: &str, members: &[String]) -> Result<()> {
    if members.is_empty() {
        return Err(ThesisError::validation(field, "at least one member is required"));
    }
    if members.iter().any(|member| member.trim().is_empty()) {
        return Err(ThesisError::validation(field, "member names must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ThesisSubmission {
        ThesisSubmission {
            title: "X".to_string(),
            description: "d".to_string(),
            student_name: "A".to_string(),
            mentor_name: "B".to_string(),
            department: "CS".to_string(),
        }
    }

    #[test]
    fn test_submit_starts_in_submitted() {
        let record = ThesisRecord::submit(ThesisId::new("1"), submission(), Utc::now()).unwrap();
        assert_eq!(record.stage(), Stage::Submitted);
        assert!(record.validation_history().is_empty());
        assert!(record.defense().is_none());
    }

    #[test]
    fn test_submit_rejects_blank_field() {
        let mut incomplete = submission();
        incomplete.mentor_name = "   ".to_string();
        let err = ThesisRecord::submit(ThesisId::new("1"), incomplete, Utc::now()).unwrap_err();
        assert_eq!(err, ThesisError::validation("mentorName", "is required"));
    }

    #[test]
    fn test_thesis_id_accepts_numbers() {
        let id: ThesisId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
        let id: ThesisId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.to_string(), "abc");
        assert!(" ".parse::<ThesisId>().is_err());
        assert!("1/validate".parse::<ThesisId>().is_err());
        assert!("7?admin=1".parse::<ThesisId>().is_err());
        assert!("..".parse::<ThesisId>().is_err());
        assert_eq!(
            "0b7e-42.v2".parse::<ThesisId>().unwrap().path_segment().unwrap(),
            "0b7e-42.v2"
        );
    }

    #[test]
    fn test_decision_wire_names() {
        assert_eq!(
            serde_json::to_string(&Decision::NeedsRevision).unwrap(),
            "\"needs-revision\""
        );
        assert_eq!("conditional".parse::<Decision>().unwrap(), Decision::Conditional);
    }

    #[test]
    fn test_role_decision_pairings() {
        assert!(ActorRole::Mentor.may_decide(Decision::NeedsRevision));
        assert!(!ActorRole::Mentor.may_decide(Decision::Pending));
        assert!(ActorRole::Administration.may_decide(Decision::Pending));
        assert!(!ActorRole::Administration.may_decide(Decision::Conditional));
        assert!(ActorRole::Commission.may_decide(Decision::Conditional));
        assert!(ActorRole::Student.allowed_decisions().is_empty());
    }

    #[test]
    fn test_defense_schedule_parsing() {
        let schedule = DefenseSchedule {
            date: "2024-06-01".to_string(),
            time: "14:30".to_string(),
            location: "Room 101".to_string(),
            commission_members: vec!["Dr. Smith".to_string()],
            notes: None,
        };
        schedule.validate().unwrap();
        assert_eq!(
            schedule.scheduled_at().unwrap().to_rfc3339(),
            "2024-06-01T14:30:00+00:00"
        );

        let bad = DefenseSchedule {
            time: "2pm".to_string(),
            ..schedule.clone()
        };
        assert!(matches!(
            bad.validate(),
            Err(ThesisError::Validation { ref field, .. }) if field == "time"
        ));

        let nobody = DefenseSchedule {
            commission_members: vec![],
            ..schedule
        };
        assert!(nobody.validate().is_err());
    }

    #[test]
    fn test_edit_details_only_before_first_validation() {
        let mut record = ThesisRecord::submit(ThesisId::new("1"), submission(), Utc::now()).unwrap();
        record
            .edit_details("New title", "longer description", "Math")
            .unwrap();
        assert_eq!(record.title, "New title");

        record.validation_history.push(ValidationEvent {
            actor_role: ActorRole::Mentor,
            decision: Decision::NeedsRevision,
            comments: "more work".to_string(),
            phase: None,
            timestamp: Utc::now(),
        });
        let err = record.edit_details("Again", "d", "CS").unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(record.title, "New title");
    }

    #[test]
    fn test_record_deserializes_with_missing_collections() {
        let json = r#"{
            "id": 3,
            "title": "AI Ethics and Social Impact",
            "description": "d",
            "department": "Computer Science",
            "studentName": "Mike Johnson",
            "mentorName": "Dr. Brown",
            "submittedDate": "2024-01-20T00:00:00Z"
        }"#;
        let record: ThesisRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "3");
        assert_eq!(record.stage(), Stage::Submitted);
        assert!(record.reports().is_empty());
    }
}
