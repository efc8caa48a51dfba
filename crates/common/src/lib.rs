//! ReviewDesk Common Library
//!
//! Shared code for the ReviewDesk services including:
//! - The paper lifecycle and peer-review workflow engine
//! - Database models and repository patterns
//! - Error types and handling
//! - Configuration management
//! - Identity context and authorization
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod workflow;

// Re-export commonly used types
pub use auth::{Role, UserContext};
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use workflow::WorkflowEngine;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
