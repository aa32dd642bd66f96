//! Talon Core - contracts and conventions of the Talon bot framework.
//!
//! This crate provides:
//! - The class contracts: [`SlashCommand`], [`EventHandler`], [`Job`], [`Entity`]
//! - Naming conventions that turn class names into identifiers ([`naming`])
//! - The static export manifest filled by `#[export]` ([`export`])
//! - The gateway seam: [`Gateway`], [`GatewaySink`], [`Interaction`]
//! - The application command wire format ([`wire`])

pub mod command;
pub mod context;
pub mod entity;
pub mod error;
pub mod event;
pub mod export;
pub mod gateway;
pub mod interaction;
pub mod job;
pub mod kind;
pub mod naming;
pub mod wire;

pub use command::SlashCommand;
pub use context::ClassContext;
pub use entity::{Entity, EntityInfo};
pub use error::{GatewayError, GatewayResult, NamingError};
pub use event::{EventArgs, EventHandler, INTERACTION_CREATE};
pub use export::{ClassDef, EXPORTS, Export, exports};
pub use gateway::{CommandScope, ConfigurableGateway, Gateway, GatewaySink};
pub use interaction::{CommandContext, Interaction, Reply, ReplyState, respond};
pub use job::Job;
pub use kind::ClassKind;
pub use wire::{
    CommandData, CommandOption, IntegrationType, InteractionContext, OptionChoice, OptionKind,
};

// Re-exported so implementors need no direct dependency.
pub use async_trait::async_trait;
pub use talon_config as config;

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}
