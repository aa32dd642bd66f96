//! # Talon Adapter for serenity
//!
//! Connects the Talon bot framework to Discord through
//! [serenity](https://docs.rs/serenity).
//!
//! ## Overview
//!
//! - [`SerenityGateway`] pushes command definitions over REST and forwards
//!   gateway traffic to the runtime
//! - [`SerenityInteraction`] answers slash commands and tracks their reply
//!   state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use talon::prelude::*;
//! use talon_adapter_serenity::SerenityGateway;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     TalonRuntime::builder().build::<SerenityGateway>()?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Forwarded Events
//!
//! | Gateway event         | Talon event name  | Values                 |
//! |-----------------------|-------------------|------------------------|
//! | `READY`               | `ready`           | ready payload          |
//! | `MESSAGE_CREATE`      | `messageCreate`   | message                |
//! | `GUILD_CREATE`        | `guildCreate`     | guild, `is_new`        |
//! | `GUILD_MEMBER_ADD`    | `guildMemberAdd`  | member                 |
//!
//! Chat-input interactions are routed to commands and never reach the event
//! bus.

mod gateway;
mod handler;
mod interaction;

pub use gateway::SerenityGateway;
pub use handler::events;
pub use interaction::SerenityInteraction;

pub use serenity;
