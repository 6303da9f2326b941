//! File storage primitives.

pub mod atomic_file;
pub mod credential_storage;

pub use atomic_file::{AtomicFile, FileFormat};
pub use credential_storage::FileCredentialStore;
