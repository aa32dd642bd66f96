use talon::prelude::*;

/// Per-guild overrides, stored in `guild_settings`.
#[export]
pub struct GuildSettingsEntity {
    pub guild_id: String,
    pub welcome_channel_id: Option<String>,
}

impl Entity for GuildSettingsEntity {
    fn table() -> Option<&'static str> {
        Some("guild_settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name() {
        assert_eq!(GuildSettingsEntity::info().unwrap().table, "guild_settings");
    }
}
