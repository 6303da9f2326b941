pub mod auth;
pub mod config;
pub mod context;
pub mod listing;
pub mod render;
pub mod workflow;
