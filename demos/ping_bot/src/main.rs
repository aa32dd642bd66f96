//! Ping Bot
//!
//! A small Discord bot laid out the Talon way: every class lives in the
//! directory of its kind and is found by discovery.
//!
//! ```text
//! src/
//! ├── commands/   ping_command.rs, user_info_command.rs
//! ├── events/     ready_event.rs, guild_member_add_event.rs
//! ├── jobs/       stats_report_job.rs
//! └── entities/   guild_settings_entity.rs
//! ```
//!
//! # Usage
//!
//! Discovery resolves its directories against the working directory, so run
//! the bot from this crate's root:
//!
//! ```bash
//! cd demos/ping_bot
//! cp .env.example .env   # fill in TOKEN and the database settings
//! cargo run
//! ```

mod commands;
mod entities;
mod events;
mod jobs;
mod settings;

use talon::prelude::*;
use talon_adapter_serenity::SerenityGateway;

use crate::settings::BotSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let runtime = TalonRuntime::builder().build_with::<BotSettings, SerenityGateway>()?;
    runtime.run().await?;
    Ok(())
}
