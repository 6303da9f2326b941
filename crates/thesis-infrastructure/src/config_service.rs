//! Configuration service.
//!
//! Loads `ClientConfig` from `<config dir>/config.toml`, applies environment
//! overrides and caches the result.

use crate::paths::ThesisPaths;
use crate::storage::AtomicFile;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use thesis_core::config::ClientConfig;
use thesis_core::{Result, ThesisError};

/// Environment variables consulted after the file.
pub const ENV_OVERRIDES: [&str; 2] = ["THESIS_DESK_API_URL", "THESIS_DESK_BACKEND"];

/// Loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    overrides: Vec<(String, String)>,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Service for the default config file, with overrides read from the process environment.
    pub fn new(paths: &ThesisPaths) -> Result<Self> {
        let overrides = ENV_OVERRIDES
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Ok(Self::with_overrides(paths.config_file()?, overrides))
    }

    /// Service for an explicit file and override set (for testing).
    pub fn with_overrides(path: PathBuf, overrides: Vec<(String, String)>) -> Self {
        Self {
            path,
            overrides,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| ThesisError::internal("config cache poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| ThesisError::internal("config cache poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Writes `config` to the config file and drops the cached copy.
    pub fn save_config(&self, config: &ClientConfig) -> Result<()> {
        config.validate()?;
        AtomicFile::toml(self.path.clone()).save(config)?;
        tracing::info!("Saved configuration to {}", self.path.display());
        self.invalidate_cache();
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            ClientConfig::from_toml(&content)?
        } else {
            tracing::debug!("No config at {}, using defaults", self.path.display());
            ClientConfig::default()
        };

        for (name, value) in &self.overrides {
            config.apply_override(name, value)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use thesis_core::config::BackendKind;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_overrides(temp_dir.path().join("config.toml"), vec![]);
        assert_eq!(service.get_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api]\nbase_url = \"http://file/api\"\n").unwrap();

        let service = ConfigService::with_overrides(
            path,
            vec![
                ("THESIS_DESK_API_URL".to_string(), "http://env/api".to_string()),
                ("THESIS_DESK_BACKEND".to_string(), "local".to_string()),
            ],
        );
        let config = service.get_config().unwrap();
        assert_eq!(config.api.base_url, "http://env/api");
        assert_eq!(config.backend.kind, BackendKind::Local);
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[listing]\nmax_results = 10\n").unwrap();

        let service = ConfigService::with_overrides(path.clone(), vec![]);
        assert_eq!(service.get_config().unwrap().listing.max_results, 10);

        fs::write(&path, "[listing]\nmax_results = 20\n").unwrap();
        assert_eq!(service.get_config().unwrap().listing.max_results, 10);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().listing.max_results, 20);
    }

    #[test]
    fn test_saved_config_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config").join("config.toml");
        let service = ConfigService::with_overrides(path.clone(), vec![]);

        let mut config = service.get_config().unwrap();
        config.listing.max_results = 50;
        config.backend.kind = BackendKind::Local;
        service.save_config(&config).unwrap();

        assert!(fs::read_to_string(&path).unwrap().contains("max_results = 50"));
        assert_eq!(service.get_config().unwrap(), config);
    }

    #[test]
    fn test_invalid_config_not_saved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_overrides(path.clone(), vec![]);

        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        assert!(service.save_config(&config).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();

        let service = ConfigService::with_overrides(path, vec![]);
        assert!(service.get_config().is_err());
    }
}
