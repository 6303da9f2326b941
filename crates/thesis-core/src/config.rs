//! Client configuration model.
//!
//! Every field has a default, so an empty `config.toml` is a valid configuration.

use crate::error::{Result, ThesisError};
use crate::thesis::WorkflowPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RESULTS: usize = 200;

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub api: ApiConfig,
    pub listing: ListingConfig,
    pub workflow: WorkflowPolicy,
    pub backend: BackendConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            api: ApiConfig::default(),
            listing: ListingConfig::default(),
            workflow: WorkflowPolicy::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses TOML text. Blank input yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        toml::from_str(content).map_err(|e| ThesisError::config(format!("invalid config.toml: {e}")))
    }

    /// Applies an override value by its environment variable name.
    ///
    /// Unknown names are ignored; a malformed value is a configuration error.
    pub fn apply_override(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "THESIS_DESK_API_URL" => self.api.base_url = value.trim().to_string(),
            "THESIS_DESK_BACKEND" => {
                self.backend.kind = BackendKind::from_str(value.trim()).map_err(|_| {
                    ThesisError::config(format!(
                        "THESIS_DESK_BACKEND must be 'remote' or 'local', got '{value}'"
                    ))
                })?
            }
            _ => {}
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ThesisError::config("api.base_url must not be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(ThesisError::config("api.timeout_secs must be positive"));
        }
        if self.listing.max_results == 0 {
            return Err(ThesisError::config("listing.max_results must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub max_results: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// The REST API at `api.base_url`.
    #[default]
    Remote,
    /// The file-backed backend in the data directory.
    Local,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
}
