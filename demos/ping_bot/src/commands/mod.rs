pub mod ping_command;
pub mod user_info_command;
