//! Runtime error types.

use talon_config::ConfigError;
use talon_core::GatewayError;
use thiserror::Error;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Gateway error.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// No job is registered under this name.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// A manually triggered job returned an error.
    #[error("Job `{name}` failed: {message}")]
    JobFailed { name: String, message: String },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
