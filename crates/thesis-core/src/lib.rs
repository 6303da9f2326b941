//! Domain layer of Thesis Desk.
//!
//! Holds the thesis record, the approval workflow state machine, the listing
//! projection, the session model and the gateway traits. Nothing here does I/O.

pub mod config;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod session;
pub mod thesis;

// Re-export common error type
pub use error::{Result, ThesisError};
