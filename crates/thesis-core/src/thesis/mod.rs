//! Thesis records and the approval workflow.

pub mod model;
pub mod stage;
pub mod workflow;

pub use model::{
    ActorRole, CommissionReport, Decision, DefenseSchedule, FiledDocument, FiledReport,
    ThesisDocument, ThesisId, ThesisRecord, ThesisSubmission, ValidationEvent,
};
pub use stage::{SecretaryPhase, Stage, StageKind};
pub use workflow::{Transition, TransitionOutcome, Workflow, WorkflowPolicy, WorkflowStep};
