//! Talon Runtime - discovery, registration and orchestration for the Talon
//! bot framework.
//!
//! This crate provides:
//! - Convention-based class discovery ([`Discovery`])
//! - Registration and routing of commands, events, jobs and entities ([`Registrar`])
//! - The in-process event bus ([`EventBus`])
//! - Configuration-driven logging ([`logging`])
//! - Runtime bootstrap ([`TalonRuntime`])
//!
//! ```rust,ignore
//! use talon_adapter_serenity::SerenityGateway;
//! use talon_runtime::TalonRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TalonRuntime::builder().build::<SerenityGateway>()?;
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod events;
pub mod logging;
pub mod registrar;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use discovery::{Discovered, Discovery, LoadError, ManifestLoader, ModuleLoader};
pub use error::{RuntimeError, RuntimeResult};
pub use events::EventBus;
pub use logging::{LoggingBuilder, SpanEvents};
pub use registrar::{
    COMMAND_ERROR_REPLY, CommandOutcome, RegistrationSummary, Registrar, UNKNOWN_COMMAND_REPLY,
};
pub use runtime::{InitReport, RuntimeBuilder, TalonRuntime, wait_for_shutdown};

// Re-export tracing for use by class implementations
pub use tracing;

/// Logging macros for class implementations.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
