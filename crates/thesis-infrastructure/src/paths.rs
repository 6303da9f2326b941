//! Unified path management for Thesis Desk files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/thesis-desk/       # Config directory
//! ├── config.toml              # Client configuration
//! └── token.json               # Stored credential (0600)
//!
//! ~/.local/share/thesis-desk/  # Data directory
//! └── theses.json              # Local backend state
//! ```

use std::path::PathBuf;
use thesis_core::{Result, ThesisError};

const APP_NAME: &str = "thesis-desk";

/// Path resolution rooted either at the platform directories or at a fixed base (tests).
#[derive(Debug, Clone, Default)]
pub struct ThesisPaths {
    base: Option<PathBuf>,
}

impl ThesisPaths {
    /// Platform directories (XDG on Linux).
    pub fn new() -> Self {
        Self { base: None }
    }

    /// Everything under `base`: `base/config` and `base/data`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or_else(|| ThesisError::config("cannot determine the config directory")),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_NAME))
                .ok_or_else(|| ThesisError::config("cannot determine the data directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// The fixed-name credential file.
    pub fn credential_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("token.json"))
    }

    pub fn local_store_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("theses.json"))
    }
}
