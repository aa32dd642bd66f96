//! # Talon
//!
//! A convention-driven Discord bot framework for Rust.
//!
//! ## Overview
//!
//! A Talon bot is a set of classes laid out by convention. A type named
//! `PingCommand`, marked with `#[export]`, implementing [`SlashCommand`] and
//! living in `src/commands/ping_command.rs` becomes the `/ping` command with
//! no registration code. Event handlers, jobs and entities work the same way
//! with the `Event`, `Job` and `Entity` suffixes.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌───────────┐    ┌───────────┐
//! │  Config   │───▶│ Discovery │───▶│ Registrar │◀──▶│  Gateway  │
//! │ (figment) │    │ (exports) │    │ (routing) │    │ (serenity)│
//! └───────────┘    └───────────┘    └───────────┘    └───────────┘
//! ```
//!
//! - **Config**: defaults, `talon.toml`, `.env` and overrides, validated at once
//! - **Discovery**: matches files in the configured directories against the
//!   exports linked into the binary
//! - **Registrar**: instantiates classes, pushes commands, routes interactions
//!   and events
//! - **Gateway**: the connection to Discord, behind the [`Gateway`] trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! // src/commands/ping_command.rs
//! use talon::prelude::*;
//!
//! #[export]
//! pub struct PingCommand;
//!
//! #[async_trait]
//! impl SlashCommand for PingCommand {
//!     fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
//!         Ok(Self)
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Replies with pong"
//!     }
//!
//!     async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
//!         ctx.respond("Pong!").await?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ```rust,ignore
//! // src/main.rs
//! use talon::prelude::*;
//! use talon_adapter_serenity::SerenityGateway;
//!
//! mod commands;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     TalonRuntime::builder().build::<SerenityGateway>()?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Load `talon.toml` (default)
//! - `json-log`: JSON log output

pub use talon_config as config;
pub use talon_core as core;
pub use talon_runtime as runtime;

pub use talon_core::{EventHandler, Gateway, Job, SlashCommand};
pub use talon_macros::export;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use talon::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use talon_runtime::{RuntimeBuilder, TalonRuntime};

    // Contracts - what bot classes implement
    pub use talon_core::{Entity, EventHandler, Job, SlashCommand};
    pub use talon_macros::export;

    // What the contracts receive
    pub use talon_core::{
        ClassContext, CommandContext, CommandOption, EventArgs, IntegrationType,
        InteractionContext, OptionChoice, OptionKind, Reply,
    };

    // Configuration
    pub use talon_config::{ConfigLoader, ConfigSchema, NoExtra, TalonConfig, Violations};

    pub use talon_core::async_trait;
}
