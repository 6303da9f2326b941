//! Session domain module.
//!
//! - `model`: the explicit session context passed to every gateway call
//! - `credential`: the persisted credential and its storage trait

mod credential;
mod model;

pub use credential::{CredentialStore, StoredCredential};
pub use model::{Credential, Session, Verification};
