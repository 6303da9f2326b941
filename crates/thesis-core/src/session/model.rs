use crate::thesis::ActorRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer token. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for the authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Whether the credential has been accepted by the backend in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Confirmed by a login or by a successful authorized call.
    Verified,
    /// Restored from storage, not yet confirmed.
    Unverified,
}

/// The authenticated user context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: String,
    /// Role reported by the backend, if any.
    pub role: Option<ActorRole>,
    pub credential: Credential,
    pub verification: Verification,
    pub established_at: DateTime<Utc>,
}

impl Session {
    /// A session fresh from a successful login.
    pub fn verified(
        identity: impl Into<String>,
        role: Option<ActorRole>,
        credential: Credential,
    ) -> Self {
        Self {
            identity: identity.into(),
            role,
            credential,
            verification: Verification::Verified,
            established_at: Utc::now(),
        }
    }

    /// A session restored from storage without a server round trip.
    pub fn restored(
        identity: impl Into<String>,
        role: Option<ActorRole>,
        credential: Credential,
    ) -> Self {
        Self {
            verification: Verification::Unverified,
            ..Self::verified(identity, role, credential)
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verification == Verification::Verified
    }

    pub fn mark_verified(&mut self) {
        self.verification = Verification::Verified;
    }
}
