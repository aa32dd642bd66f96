//! Entity declarations.
//!
//! Entities describe persistent tables. The framework only discovers them and
//! hands their metadata to the ORM; it never creates or migrates tables.

use crate::error::NamingError;
use crate::naming::{self, short_type_name};

/// A persistent entity.
///
/// ```rust,ignore
/// #[export]
/// pub struct GuildSettingsEntity {
///     pub guild_id: String,
///     pub prefix: String,
/// }
///
/// impl Entity for GuildSettingsEntity {}
/// ```
pub trait Entity: Send + Sync + 'static {
    /// Explicit table name; the class name without its suffix when `None`.
    fn table() -> Option<&'static str>
    where
        Self: Sized,
    {
        None
    }

    /// Metadata handed to the ORM.
    fn info() -> Result<EntityInfo, NamingError>
    where
        Self: Sized,
    {
        let class_name = short_type_name(std::any::type_name::<Self>());
        let table = match Self::table() {
            Some(table) if table.trim().is_empty() => {
                return Err(NamingError::EmptyIdentifier {
                    class: class_name.to_owned(),
                    what: "table name",
                });
            }
            Some(table) => table.to_owned(),
            None => naming::entity_name_to_table(class_name)?,
        };

        Ok(EntityInfo {
            class_name,
            table,
            type_name: std::any::type_name::<Self>(),
        })
    }
}

/// What the ORM needs to know about an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    pub class_name: &'static str,
    pub table: String,
    /// Fully qualified Rust type name.
    pub type_name: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct GuildSettingsEntity;
    impl Entity for GuildSettingsEntity {}

    struct AuditEntity;
    impl Entity for AuditEntity {
        fn table() -> Option<&'static str> {
            Some("audit_log")
        }
    }

    #[test]
    fn test_entity_info() {
        let info = GuildSettingsEntity::info().unwrap();
        assert_eq!(info.class_name, "GuildSettingsEntity");
        assert_eq!(info.table, "GuildSettings");

        assert_eq!(AuditEntity::info().unwrap().table, "audit_log");
    }
}
