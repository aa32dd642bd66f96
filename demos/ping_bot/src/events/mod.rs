pub mod guild_member_add_event;
pub mod ready_event;
