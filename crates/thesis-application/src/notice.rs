//! User-facing notifications.

use serde::{Deserialize, Serialize};
use strum::Display;
use thesis_core::{Result, ThesisError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Non-blocking report of one action's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, err: &ThesisError) -> Self {
        let title: String = title.into();
        let description = match err {
            ThesisError::Conflict { .. } => {
                format!("{err}. Refresh the thesis and retry deliberately.")
            }
            _ => err.to_string(),
        };
        Self {
            level: NoticeLevel::Error,
            title: format!("{title} ({})", err.category()),
            description,
        }
    }

    /// Notice for an action result; `describe` renders the success value.
    pub fn from_outcome<T>(
        action: &str,
        outcome: &Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Self {
        match outcome {
            Ok(value) => Self::success(format!("{action} succeeded"), describe(value)),
            Err(err) => Self::error(format!("{action} failed"), err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
