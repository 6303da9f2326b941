//! The thesis approval state machine.
//!
//! Every state change of a [`ThesisRecord`] goes through [`Workflow::apply`],
//! which checks, in order:
//!
//! 1. the actor holds the role the transition requires (authorization error),
//! 2. the payload is complete and the decision is legal for the role (validation error),
//! 3. the record sits in the exact stage/sub-phase the transition targets (conflict).
//!
//! A defense whose time has passed counts as being in commission review for
//! the stage check. The record is left untouched when any check fails.

use crate::error::{Result, ThesisError};
use crate::thesis::model::{
    require, require_members, ActorRole, CommissionReport, Decision, DefenseSchedule,
    FiledDocument, FiledReport, ThesisDocument, ThesisId, ThesisRecord, ThesisSubmission,
    ValidationEvent,
};
use crate::thesis::stage::{SecretaryPhase, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Limits for the no-progress outcomes (`pending`, `conditional`).
///
/// `None` lifts the bound; it is written as `"unbounded"` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowPolicy {
    /// Consecutive administration `pending` decisions allowed in one review.
    #[serde(with = "bound")]
    pub max_administration_pending: Option<u32>,
    /// Consecutive commission `conditional` decisions allowed in one review.
    #[serde(with = "bound")]
    pub max_commission_conditional: Option<u32>,
}

/// A count, or the keyword `"unbounded"` for no limit.
mod bound {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const UNBOUNDED: &str = "unbounded";

    pub fn serialize<S>(limit: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match limit {
            Some(limit) => serializer.serialize_u32(*limit),
            None => serializer.serialize_str(UNBOUNDED),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawBound {
            Limit(u32),
            Keyword(String),
        }

        match RawBound::deserialize(deserializer)? {
            RawBound::Limit(limit) => Ok(Some(limit)),
            RawBound::Keyword(keyword) if keyword == UNBOUNDED => Ok(None),
            RawBound::Keyword(other) => Err(D::Error::custom(format!(
                "expected a count or \"{UNBOUNDED}\", got '{other}'"
            ))),
        }
    }
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            max_administration_pending: Some(3),
            max_commission_conditional: Some(2),
        }
    }
}

/// A requested state change, tagged by action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Transition {
    MentorDecision {
        decision: Decision,
        comments: String,
    },
    SecretaryDecision {
        phase: SecretaryPhase,
        decision: Decision,
        comments: String,
    },
    AdministrationDecision {
        decision: Decision,
        comments: String,
    },
    CommissionDecision {
        decision: Decision,
        comments: String,
    },
    AssignCommission {
        members: Vec<String>,
    },
    ScheduleDefense(DefenseSchedule),
    SubmitCommissionReport(CommissionReport),
    UploadDocument(ThesisDocument),
    UploadRevision(ThesisDocument),
    MarkDefended,
    Archive,
}

impl Transition {
    /// Name of the gateway action carrying this transition.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::MentorDecision { .. } => "validateByMentor",
            Self::SecretaryDecision { .. } => "validateBySecretary",
            Self::AdministrationDecision { .. } => "validateByAdministration",
            Self::CommissionDecision { .. } => "validateByCommission",
            Self::AssignCommission { .. } => "selectCommissionMembers",
            Self::ScheduleDefense(_) => "scheduleDefense",
            Self::SubmitCommissionReport(_) => "submitCommissionReport",
            Self::UploadDocument(_) => "uploadThesis",
            Self::UploadRevision(_) => "uploadRevisedThesis",
            Self::MarkDefended => "markThesisDefended",
            Self::Archive => "archiveThesis",
        }
    }

    pub fn required_role(&self) -> ActorRole {
        match self {
            Self::SecretaryDecision { .. } => ActorRole::Secretary,
            Self::AdministrationDecision { .. } | Self::Archive => ActorRole::Administration,
            Self::CommissionDecision { .. } => ActorRole::Commission,
            Self::MentorDecision { .. }
            | Self::AssignCommission { .. }
            | Self::ScheduleDefense(_)
            | Self::SubmitCommissionReport(_)
            | Self::UploadDocument(_)
            | Self::UploadRevision(_)
            | Self::MarkDefended => ActorRole::Mentor,
        }
    }

    /// Payload checks that need no record: required fields and role/decision pairing.
    pub fn check_payload(&self) -> Result<()> {
        match self {
            Self::MentorDecision { decision, comments }
            | Self::SecretaryDecision {
                decision, comments, ..
            }
            | Self::AdministrationDecision { decision, comments }
            | Self::CommissionDecision { decision, comments } => {
                let role = self.required_role();
                if !role.may_decide(*decision) {
                    return Err(ThesisError::validation(
                        "decision",
                        format!("{role} cannot record '{decision}'"),
                    ));
                }
                require("comments", comments)
            }
            Self::AssignCommission { members } => require_members("members", members),
            Self::ScheduleDefense(schedule) => schedule.validate(),
            Self::SubmitCommissionReport(report) => require("report", &report.report),
            Self::UploadDocument(document) | Self::UploadRevision(document) => {
                require("document", &document.document)
            }
            Self::MarkDefended | Self::Archive => Ok(()),
        }
    }
}

/// What [`Workflow::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub from: Stage,
    pub to: Stage,
    /// A validation event was appended to the history.
    pub event_recorded: bool,
}

/// One entry of a replayed history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    pub actor: ActorRole,
    pub transition: Transition,
    pub at: DateTime<Utc>,
}

/// The state machine, parameterised by its no-progress policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workflow {
    policy: WorkflowPolicy,
}

impl Workflow {
    pub fn new(policy: WorkflowPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    /// Whether `record` waits on a defense whose time has passed.
    pub fn is_due(&self, record: &ThesisRecord, now: DateTime<Utc>) -> bool {
        record.stage == Stage::DefenseScheduling
            && record
                .defense
                .as_ref()
                .and_then(|defense| defense.scheduled_at().ok())
                .is_some_and(|at| at <= now)
    }

    /// Moves a scheduled record into commission review once its defense time has passed.
    ///
    /// Returns `true` when the stage changed.
    pub fn advance_due(&self, record: &mut ThesisRecord, now: DateTime<Utc>) -> bool {
        let due = self.is_due(record, now);
        if due {
            record.stage = Stage::CommissionReview {
                revision_requested: false,
            };
        }
        due
    }

    /// Applies `transition` on behalf of `actor`.
    pub fn apply(
        &self,
        record: &mut ThesisRecord,
        actor: ActorRole,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let required = transition.required_role();
        if actor != required {
            return Err(ThesisError::authorization(format!(
                "{} requires the {required} role, not {actor}",
                transition.action_name()
            )));
        }
        transition.check_payload()?;

        let mut draft = record.clone();
        self.advance_due(&mut draft, now);
        let outcome = self.step(&mut draft, transition, now)?;
        *record = draft;
        Ok(outcome)
    }

    fn step(
        &self,
        record: &mut ThesisRecord,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome> {
        let from = record.stage;
        let event_recorded = match transition {
            Transition::MentorDecision { decision, comments } => {
                let first_review =
                    record.stage == Stage::Submitted && record.validation_history.is_empty();
                if !first_review && record.stage != Stage::MentorReview {
                    return Err(conflict("submitted|mentor-review", record));
                }
                push_event(record, ActorRole::Mentor, decision, comments, None, now);
                record.stage = match decision {
                    Decision::Approved => Stage::SecretaryReview {
                        phase: SecretaryPhase::First,
                    },
                    _ => Stage::Submitted,
                };
                true
            }
            Transition::SecretaryDecision {
                phase,
                decision,
                comments,
            } => {
                if record.stage.secretary_phase() != Some(phase) {
                    return Err(conflict(Stage::SecretaryReview { phase }, record));
                }
                push_event(record, ActorRole::Secretary, decision, comments, Some(phase), now);
                match decision {
                    Decision::Approved => {
                        record.stage = match phase.next() {
                            Some(next) => Stage::SecretaryReview { phase: next },
                            None => Stage::AdministrationReview,
                        };
                    }
                    _ => return_to_mentor_review(record),
                }
                true
            }
            Transition::AdministrationDecision { decision, comments } => {
                if record.stage != Stage::AdministrationReview {
                    return Err(conflict(Stage::AdministrationReview, record));
                }
                if decision == Decision::Pending {
                    check_bound(
                        record,
                        ActorRole::Administration,
                        Decision::Pending,
                        self.policy.max_administration_pending,
                    )?;
                }
                push_event(record, ActorRole::Administration, decision, comments, None, now);
                match decision {
                    Decision::Approved => record.stage = Stage::CommissionAssignment,
                    Decision::Rejected => return_to_mentor_review(record),
                    _ => {}
                }
                true
            }
            Transition::CommissionDecision { decision, comments } => {
                let open = Stage::CommissionReview {
                    revision_requested: false,
                };
                if record.stage != open {
                    return Err(conflict(open, record));
                }
                if decision == Decision::Conditional {
                    check_bound(
                        record,
                        ActorRole::Commission,
                        Decision::Conditional,
                        self.policy.max_commission_conditional,
                    )?;
                }
                push_event(record, ActorRole::Commission, decision, comments, None, now);
                match decision {
                    Decision::Approved => record.stage = Stage::Defended { marked: false },
                    Decision::Conditional => {
                        record.stage = Stage::CommissionReview {
                            revision_requested: true,
                        }
                    }
                    _ => return_to_mentor_review(record),
                }
                true
            }
            Transition::AssignCommission { members } => {
                if record.stage != Stage::CommissionAssignment {
                    return Err(conflict(Stage::CommissionAssignment, record));
                }
                record.commission_members = members
                    .into_iter()
                    .map(|member| member.trim().to_string())
                    .collect();
                record.stage = Stage::DefenseScheduling;
                false
            }
            Transition::ScheduleDefense(schedule) => {
                if record.stage != Stage::DefenseScheduling || record.defense.is_some() {
                    return Err(conflict("defense-scheduling (unscheduled)", record));
                }
                record.defense = Some(schedule);
                false
            }
            Transition::SubmitCommissionReport(report) => {
                if !matches!(
                    record.stage,
                    Stage::CommissionReview { .. } | Stage::Defended { marked: false }
                ) {
                    return Err(conflict("commission-review|defended (unmarked)", record));
                }
                record.reports.push(FiledReport {
                    report,
                    filed_at: now,
                });
                false
            }
            Transition::UploadDocument(document) => {
                if !matches!(record.stage, Stage::Submitted | Stage::MentorReview) {
                    return Err(conflict("submitted|mentor-review", record));
                }
                push_document(record, document, false, now);
                false
            }
            Transition::UploadRevision(document) => {
                match record.stage {
                    Stage::Submitted if !record.validation_history.is_empty() => {
                        record.stage = Stage::MentorReview;
                    }
                    Stage::CommissionReview {
                        revision_requested: true,
                    } => {
                        record.stage = Stage::CommissionReview {
                            revision_requested: false,
                        };
                    }
                    _ => {
                        return Err(conflict(
                            "submitted (after rejection)|commission-review (revision requested)",
                            record,
                        ));
                    }
                }
                push_document(record, document, true, now);
                false
            }
            Transition::MarkDefended => {
                let unmarked = Stage::Defended { marked: false };
                if record.stage != unmarked {
                    return Err(conflict(unmarked, record));
                }
                record.stage = Stage::Defended { marked: true };
                false
            }
            Transition::Archive => {
                let marked = Stage::Defended { marked: true };
                if record.stage != marked {
                    return Err(conflict(marked, record));
                }
                record.stage = Stage::Archived;
                false
            }
        };

        Ok(TransitionOutcome {
            from,
            to: record.stage,
            event_recorded,
        })
    }

    /// Rebuilds a record from its submission and the ordered steps applied to it.
    ///
    /// The stage of the result depends on nothing but these inputs.
    pub fn replay<I>(
        &self,
        id: ThesisId,
        submission: ThesisSubmission,
        submitted_at: DateTime<Utc>,
        steps: I,
    ) -> Result<ThesisRecord>
    where
        I: IntoIterator<Item = WorkflowStep>,
    {
        let mut record = ThesisRecord::submit(id, submission, submitted_at)?;
        for step in steps {
            self.apply(&mut record, step.actor, step.transition, step.at)?;
        }
        Ok(record)
    }
}

fn conflict(expected: impl ToString, record: &ThesisRecord) -> ThesisError {
    ThesisError::conflict(expected.to_string(), record.stage.to_string())
}

fn push_event(
    record: &mut ThesisRecord,
    actor_role: ActorRole,
    decision: Decision,
    comments: String,
    phase: Option<SecretaryPhase>,
    timestamp: DateTime<Utc>,
) {
    record.validation_history.push(ValidationEvent {
        actor_role,
        decision,
        comments: comments.trim().to_string(),
        phase,
        timestamp,
    });
}

fn push_document(
    record: &mut ThesisRecord,
    document: ThesisDocument,
    revision: bool,
    uploaded_at: DateTime<Utc>,
) {
    record.documents.push(FiledDocument {
        document,
        revision,
        uploaded_at,
    });
}

/// Back to mentor review; the active defense and commission belong to the abandoned pass.
fn return_to_mentor_review(record: &mut ThesisRecord) {
    if let Some(defense) = record.defense.take() {
        record.previous_defenses.push(defense);
    }
    record.commission_members.clear();
    record.stage = Stage::MentorReview;
}

fn check_bound(
    record: &ThesisRecord,
    role: ActorRole,
    decision: Decision,
    limit: Option<u32>,
) -> Result<()> {
    let Some(limit) = limit else {
        return Ok(());
    };
    if record.trailing_decisions(role, decision) >= limit as usize {
        return Err(ThesisError::validation(
            "decision",
            format!("'{decision}' already recorded {limit} times in a row; {role} must approve or reject"),
        ));
    }
    Ok(())
}
