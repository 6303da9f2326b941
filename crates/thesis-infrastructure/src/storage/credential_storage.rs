//! Credential file storage.
//!
//! Keeps the one credential of this client in `token.json` next to the
//! configuration. The file is written with `0600` permissions on Unix and its
//! content is never logged.

use crate::paths::ThesisPaths;
use crate::storage::atomic_file::AtomicFile;
use async_trait::async_trait;
use std::path::PathBuf;
use thesis_core::session::{CredentialStore, StoredCredential};
use thesis_core::Result;

const CREDENTIAL_MODE: u32 = 0o600;

/// [`CredentialStore`] backed by a fixed-name JSON file.
pub struct FileCredentialStore {
    file: AtomicFile<StoredCredential>,
}

impl FileCredentialStore {
    /// Store at the default location (`<config dir>/token.json`).
    pub fn new(paths: &ThesisPaths) -> Result<Self> {
        Ok(Self::with_path(paths.credential_file()?))
    }

    /// Store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path).with_mode(CREDENTIAL_MODE),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<StoredCredential>> {
        let stored = self.file.load()?;
        // A blank token is as good as none.
        Ok(stored.filter(|credential| !credential.token.is_blank()))
    }

    async fn save(&self, credential: &StoredCredential) -> Result<()> {
        self.file.save(credential)?;
        tracing::debug!("Stored credential at {}", self.file.path().display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("Cleared stored credential");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use thesis_core::session::Credential;
    use thesis_core::thesis::ActorRole;

    fn stored(token: &str) -> StoredCredential {
        StoredCredential {
            token: Credential::new(token),
            identity: Some("alice".to_string()),
            role: Some(ActorRole::Mentor),
        }
    }

    #[tokio::test]
    async fn test_load_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("token.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::with_path(temp_dir.path().join("token.json"));

        store.save(&stored("abc")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(stored("abc")));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_token_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token.json");
        std::fs::write(&path, r#"{ "token": "  " }"#).unwrap();

        let store = FileCredentialStore::with_path(path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_credential_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(&ThesisPaths::with_base(temp_dir.path())).unwrap();
        store.save(&stored("abc")).await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
