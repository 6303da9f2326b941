//! Remote REST API adapter.

pub mod client;
pub mod gateway;
pub mod wire;

pub use client::ApiClient;
pub use gateway::HttpGateway;
