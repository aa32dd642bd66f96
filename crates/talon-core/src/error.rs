//! Error types shared by the contracts and the gateway seam.

use thiserror::Error;

// =============================================================================
// Naming Errors
// =============================================================================

/// A class name that cannot be turned into an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("invalid class name `{name}`: {reason}")]
    InvalidName {
        /// The offending class name.
        name: String,
        /// The suffix the name was expected to carry.
        suffix: String,
        reason: String,
    },

    /// An explicitly configured identifier is blank.
    #[error("`{class}` declares an empty {what}")]
    EmptyIdentifier { class: String, what: &'static str },
}

impl NamingError {
    pub(crate) fn missing_suffix(name: &str, suffix: &str) -> Self {
        Self::InvalidName {
            name: name.to_owned(),
            suffix: suffix.to_owned(),
            reason: format!("expected the `{suffix}` suffix"),
        }
    }

    pub(crate) fn empty_stem(name: &str, suffix: &str) -> Self {
        Self::InvalidName {
            name: name.to_owned(),
            suffix: suffix.to_owned(),
            reason: format!("nothing precedes the `{suffix}` suffix"),
        }
    }
}

// =============================================================================
// Gateway Errors
// =============================================================================

/// Errors reported by a gateway implementation.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway could not be configured.
    #[error("invalid gateway configuration: {0}")]
    InvalidConfig(String),

    /// Connecting or staying connected failed.
    #[error("gateway connection failed: {0}")]
    Connection(String),

    /// A request to the platform API failed.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// The interaction was already answered in a way that forbids this reply.
    #[error("interaction cannot be answered: {0}")]
    InvalidReplyState(String),

    /// The gateway has not been started or was shut down.
    #[error("gateway is not running")]
    NotRunning,
}

impl GatewayError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
