//! Procedural macros for the Talon bot framework.
//!
//! This crate provides:
//!
//! - `#[export]` - Records a type in the export manifest so discovery can find it
//!
//! # Export Attribute
//!
//! ```rust,ignore
//! use talon::prelude::*;
//!
//! #[export]
//! pub struct PingCommand;
//!
//! #[async_trait]
//! impl SlashCommand for PingCommand {
//!     // ...
//! }
//! ```

mod export;

use proc_macro::TokenStream;

/// Records the decorated type in the export manifest.
///
/// The manifest entry stores the type name, the source file (`file!()`) and
/// a resolver that detects, at compile time, which contract the type
/// implements. Discovery pairs the files it finds on disk with these entries.
///
/// # Arguments
///
/// - `crate = path` - Path to the core crate when `talon` is not a direct
///   dependency, e.g. `#[export(crate = ::talon_core)]`
///
/// # Example
///
/// ```rust,ignore
/// #[export]
/// pub struct ReadyEvent;
/// ```
#[proc_macro_attribute]
pub fn export(attr: TokenStream, item: TokenStream) -> TokenStream {
    export::export(attr, item)
}
