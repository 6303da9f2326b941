//! Infrastructure layer of Thesis Desk: storage, configuration and backends.

pub mod config_service;
pub mod http;
pub mod local_backend;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use http::{ApiClient, HttpGateway};
pub use local_backend::LocalThesisBackend;
pub use paths::ThesisPaths;
pub use storage::{AtomicFile, FileCredentialStore, FileFormat};
