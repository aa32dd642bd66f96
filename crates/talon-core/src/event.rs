//! The gateway event handler contract.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::ClassContext;
use crate::error::NamingError;
use crate::naming::{self, short_type_name};

/// Event name reserved for command routing; handlers cannot subscribe to it.
pub const INTERACTION_CREATE: &str = "interactionCreate";

/// Payload of a gateway event: its name and positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArgs {
    name: String,
    values: Vec<Value>,
}

impl EventArgs {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Deserializes the argument at `index`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Option<T> {
        self.raw(index)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A handler for one gateway event.
///
/// The event name is taken from `event()` or derived from the type name:
/// `GuildMemberAddEvent` handles `guildMemberAdd`.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Builds the instance. Called once, at registration.
    fn create(ctx: ClassContext) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Explicit event name; derived from the type name when `None`.
    fn event(&self) -> Option<&str> {
        None
    }

    /// Unsubscribe after the first delivery.
    fn once(&self) -> bool {
        false
    }

    /// Bare name of the implementing type.
    fn class_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn effective_event_name(&self) -> Result<String, NamingError> {
        match self.event() {
            Some(name) if name.trim().is_empty() => Err(NamingError::EmptyIdentifier {
                class: self.class_name().to_owned(),
                what: "event name",
            }),
            Some(name) => Ok(name.to_owned()),
            None => naming::event_name_to_id(self.class_name()),
        }
    }

    async fn execute(&self, args: &EventArgs) -> anyhow::Result<()>;

    async fn before_execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    async fn after_execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_error(&self, _args: &EventArgs, _error: &anyhow::Error) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct GuildMemberAddEvent;

    #[async_trait]
    impl EventHandler for GuildMemberAddEvent {
        fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
            Ok(Self)
        }

        async fn execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Blank;

    #[async_trait]
    impl EventHandler for Blank {
        fn create(_ctx: ClassContext) -> anyhow::Result<Self> {
            Ok(Self)
        }

        fn event(&self) -> Option<&str> {
            Some(" ")
        }

        async fn execute(&self, _args: &EventArgs) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_event_name() {
        assert_eq!(
            GuildMemberAddEvent.effective_event_name().unwrap(),
            "guildMemberAdd"
        );
        assert!(!GuildMemberAddEvent.once());
        assert!(matches!(
            Blank.effective_event_name(),
            Err(NamingError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn test_event_args() {
        let args = EventArgs::new("messageCreate", vec![json!({ "content": "hi" }), json!(3)]);

        assert_eq!(args.name(), "messageCreate");
        assert_eq!(args.get::<u8>(1), Some(3));
        assert_eq!(args.raw(0).unwrap()["content"], "hi");
        assert_eq!(args.get::<u8>(5), None);
    }
}
