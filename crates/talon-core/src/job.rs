//! The background job contract.
//!
//! Jobs are discovered and registered by name. Scheduling belongs to an
//! external queue; the framework only keeps the instances and lets them be
//! triggered by name.

use async_trait::async_trait;

use crate::context::ClassContext;
use crate::error::NamingError;
use crate::naming::{self, short_type_name};

#[async_trait]
pub trait Job: Send + Sync + 'static {
    fn create(ctx: ClassContext) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Explicit job name; derived from the type name when `None`.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Schedule expression for the external queue, e.g. a cron string.
    fn schedule(&self) -> Option<&str> {
        None
    }

    fn class_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn effective_name(&self) -> Result<String, NamingError> {
        match self.name() {
            Some(name) if name.trim().is_empty() => Err(NamingError::EmptyIdentifier {
                class: self.class_name().to_owned(),
                what: "job name",
            }),
            Some(name) => Ok(name.to_owned()),
            None => naming::job_name_to_id(self.class_name()),
        }
    }

    async fn run(&self) -> anyhow::Result<()>;
}
