pub mod guild_settings_entity;
