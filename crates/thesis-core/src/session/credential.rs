//! Credential persistence trait.

use crate::error::Result;
use crate::session::model::Credential;
use crate::thesis::ActorRole;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What survives a restart: the token plus the identity it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ActorRole>,
}

/// Persistent storage for the single credential of this client.
///
/// Implementations must never log the token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the stored credential.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: a credential is stored
    /// - `Ok(None)`: nothing stored
    /// - `Err(_)`: storage could not be read
    async fn load(&self) -> Result<Option<StoredCredential>>;

    /// Replaces the stored credential.
    async fn save(&self, credential: &StoredCredential) -> Result<()>;

    /// Removes the stored credential. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<()>;
}
