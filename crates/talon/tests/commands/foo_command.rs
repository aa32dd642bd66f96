use talon::prelude::*;

/// Follows the naming convention but is not a command.
#[export]
pub struct FooCommand {
    pub label: String,
}
