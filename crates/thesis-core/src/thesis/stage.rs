//! Workflow stages.
//!
//! A record sits in exactly one [`Stage`] at a time. Stages that carry
//! progress of their own (secretary sub-phases, a pending commission
//! revision, the defended mark) keep it inside the variant so the stage
//! alone decides which transitions are legal.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// The four ordered secretary sub-phases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SecretaryPhase {
    First,
    Second,
    Third,
    Fourth,
}

impl SecretaryPhase {
    /// The phase after this one, `None` after the fourth.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Third),
            Self::Third => Some(Self::Fourth),
            Self::Fourth => None,
        }
    }
}

/// Current position of a thesis in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Stage {
    /// Created, waiting for the mentor (or for a resubmission after a mentor rejection).
    Submitted,
    MentorReview,
    SecretaryReview {
        phase: SecretaryPhase,
    },
    AdministrationReview,
    CommissionAssignment,
    DefenseScheduling,
    CommissionReview {
        /// Set by a conditional decision; cleared by a revised upload.
        #[serde(default, rename = "revisionRequested")]
        revision_requested: bool,
    },
    Defended {
        #[serde(default)]
        marked: bool,
    },
    Archived,
}

/// Payload-free discriminant of [`Stage`], used for filtering and conflict reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum StageKind {
    Submitted,
    MentorReview,
    SecretaryReview,
    AdministrationReview,
    CommissionAssignment,
    DefenseScheduling,
    CommissionReview,
    Defended,
    Archived,
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Submitted => StageKind::Submitted,
            Self::MentorReview => StageKind::MentorReview,
            Self::SecretaryReview { .. } => StageKind::SecretaryReview,
            Self::AdministrationReview => StageKind::AdministrationReview,
            Self::CommissionAssignment => StageKind::CommissionAssignment,
            Self::DefenseScheduling => StageKind::DefenseScheduling,
            Self::CommissionReview { .. } => StageKind::CommissionReview,
            Self::Defended { .. } => StageKind::Defended,
            Self::Archived => StageKind::Archived,
        }
    }

    /// Sub-phase when in secretary review.
    pub fn secretary_phase(&self) -> Option<SecretaryPhase> {
        match self {
            Self::SecretaryReview { phase } => Some(*phase),
            _ => None,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Submitted
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretaryReview { phase } => write!(f, "secretary-review ({phase} phase)"),
            Self::CommissionReview {
                revision_requested: true,
            } => write!(f, "commission-review (revision requested)"),
            Self::Defended { marked: false } => write!(f, "defended (unmarked)"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_phase_order() {
        assert_eq!(SecretaryPhase::First.next(), Some(SecretaryPhase::Second));
        assert_eq!(SecretaryPhase::Third.next(), Some(SecretaryPhase::Fourth));
        assert_eq!(SecretaryPhase::Fourth.next(), None);
    }

    #[test]
    fn test_stage_kind_parsing() {
        assert_eq!(StageKind::from_str("archived").unwrap(), StageKind::Archived);
        assert_eq!(
            StageKind::from_str("Mentor-Review").unwrap(),
            StageKind::MentorReview
        );
        assert!(StageKind::from_str("approved").is_err());
        assert_eq!(StageKind::SecretaryReview.to_string(), "secretary-review");
    }

    #[test]
    fn test_stage_serialization_carries_phase() {
        let stage = Stage::SecretaryReview {
            phase: SecretaryPhase::Second,
        };
        let json = serde_json::to_value(stage).unwrap();
        assert_eq!(json["kind"], "secretary-review");
        assert_eq!(json["phase"], "second");

        let back: Stage = serde_json::from_value(json).unwrap();
        assert_eq!(back, stage);
    }

    #[test]
    fn test_display() {
        let stage = Stage::SecretaryReview {
            phase: SecretaryPhase::First,
        };
        assert_eq!(stage.to_string(), "secretary-review (first phase)");
        assert_eq!(Stage::Archived.to_string(), "archived");
        assert_eq!(Stage::Defended { marked: true }.to_string(), "defended");
    }
}
