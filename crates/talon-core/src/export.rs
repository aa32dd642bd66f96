//! The static export manifest.
//!
//! `#[export]` records a type in [`EXPORTS`], a linkme distributed slice
//! assembled at link time. Each entry carries the type name, the source file
//! that defined it, and a resolver that reports which contract the type
//! implements. Discovery walks the filesystem and matches files against this
//! manifest instead of loading code at runtime.

use std::fmt;
use std::path::Path;

use linkme::distributed_slice;

use crate::command::SlashCommand;
use crate::context::ClassContext;
use crate::entity::EntityInfo;
use crate::error::NamingError;
use crate::event::EventHandler;
use crate::job::Job;
use crate::kind::ClassKind;

pub type CommandFactory = fn(ClassContext) -> anyhow::Result<Box<dyn SlashCommand>>;
pub type EventFactory = fn(ClassContext) -> anyhow::Result<Box<dyn EventHandler>>;
pub type JobFactory = fn(ClassContext) -> anyhow::Result<Box<dyn Job>>;
pub type EntityFactory = fn() -> Result<EntityInfo, NamingError>;

/// The contract an exported type implements, with a way to build it.
#[derive(Debug, Clone, Copy)]
pub enum ClassDef {
    Command(CommandFactory),
    Event(EventFactory),
    Job(JobFactory),
    Entity(EntityFactory),
    /// Exported, but implements none of the contracts.
    Plain,
}

impl ClassDef {
    pub fn kind(&self) -> Option<ClassKind> {
        match self {
            Self::Command(_) => Some(ClassKind::Command),
            Self::Event(_) => Some(ClassKind::Event),
            Self::Job(_) => Some(ClassKind::Job),
            Self::Entity(_) => Some(ClassKind::Entity),
            Self::Plain => None,
        }
    }
}

/// One entry of the manifest.
#[derive(Clone, Copy)]
pub struct Export {
    name: &'static str,
    source_file: &'static str,
    resolve: fn() -> ClassDef,
}

impl Export {
    pub const fn new(name: &'static str, source_file: &'static str, resolve: fn() -> ClassDef) -> Self {
        Self {
            name,
            source_file,
            resolve,
        }
    }

    /// The exported type's name as written in the source.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `file!()` of the definition.
    pub fn source_file(&self) -> &'static str {
        self.source_file
    }

    pub fn class_def(&self) -> ClassDef {
        (self.resolve)()
    }

    pub fn kind(&self) -> Option<ClassKind> {
        self.class_def().kind()
    }

    /// Whether this export is a valid class of `kind`: the name carries the
    /// kind's suffix and the type implements the kind's contract.
    pub fn conforms_to(&self, kind: ClassKind) -> bool {
        kind.matches_name(self.name) && self.kind() == Some(kind)
    }

    /// Whether this export was defined in the file at `path`.
    ///
    /// `file!()` is relative to the workspace root, so the on-disk path only
    /// has to end with it.
    pub fn defined_in(&self, path: &Path) -> bool {
        path.ends_with(Path::new(self.source_file))
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export")
            .field("name", &self.name)
            .field("source_file", &self.source_file)
            .finish_non_exhaustive()
    }
}

/// Every type marked with `#[export]` in the final binary.
#[distributed_slice]
pub static EXPORTS: [Export];

pub fn exports() -> &'static [Export] {
    &EXPORTS
}

/// Compile-time contract detection.
///
/// Method resolution tries the receiver `&&&&Probe<T>` first and strips one
/// reference per step, so the first trait whose bound `T` satisfies wins:
/// command, then event, job, entity, and finally plain. Use through
/// [`classify!`](crate::classify).
pub mod probe {
    use std::marker::PhantomData;

    use super::ClassDef;
    use crate::command::SlashCommand;
    use crate::context::ClassContext;
    use crate::entity::Entity;
    use crate::event::EventHandler;
    use crate::job::Job;

    pub struct Probe<T>(PhantomData<fn() -> T>);

    impl<T> Probe<T> {
        pub const fn new() -> Self {
            Self(PhantomData)
        }
    }

    impl<T> Default for Probe<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T> Clone for Probe<T> {
        fn clone(&self) -> Self {
            *self
        }
    }

    impl<T> Copy for Probe<T> {}

    pub trait ProbeCommand {
        fn class_def(self) -> ClassDef;
    }

    pub trait ProbeEvent {
        fn class_def(self) -> ClassDef;
    }

    pub trait ProbeJob {
        fn class_def(self) -> ClassDef;
    }

    pub trait ProbeEntity {
        fn class_def(self) -> ClassDef;
    }

    pub trait ProbePlain {
        fn class_def(self) -> ClassDef;
    }

    fn command<T: SlashCommand>(ctx: ClassContext) -> anyhow::Result<Box<dyn SlashCommand>> {
        Ok(Box::new(T::create(ctx)?))
    }

    fn event<T: EventHandler>(ctx: ClassContext) -> anyhow::Result<Box<dyn EventHandler>> {
        Ok(Box::new(T::create(ctx)?))
    }

    fn job<T: Job>(ctx: ClassContext) -> anyhow::Result<Box<dyn Job>> {
        Ok(Box::new(T::create(ctx)?))
    }

    impl<T: SlashCommand> ProbeCommand for &&&&Probe<T> {
        fn class_def(self) -> ClassDef {
            ClassDef::Command(command::<T>)
        }
    }

    impl<T: EventHandler> ProbeEvent for &&&Probe<T> {
        fn class_def(self) -> ClassDef {
            ClassDef::Event(event::<T>)
        }
    }

    impl<T: Job> ProbeJob for &&Probe<T> {
        fn class_def(self) -> ClassDef {
            ClassDef::Job(job::<T>)
        }
    }

    impl<T: Entity> ProbeEntity for &Probe<T> {
        fn class_def(self) -> ClassDef {
            ClassDef::Entity(T::info)
        }
    }

    impl<T> ProbePlain for Probe<T> {
        fn class_def(self) -> ClassDef {
            ClassDef::Plain
        }
    }
}

/// Reports which contract a type implements, as a [`ClassDef`].
///
/// ```rust,ignore
/// assert!(matches!(talon_core::classify!(PingCommand), ClassDef::Command(_)));
/// ```
#[macro_export]
macro_rules! classify {
    ($ty:ty) => {{
        #[allow(unused_imports)]
        use $crate::export::probe::{
            ProbeCommand as _, ProbeEntity as _, ProbeEvent as _, ProbeJob as _, ProbePlain as _,
        };
        (&&&&$crate::export::probe::Probe::<$ty>::new()).class_def()
    }};
}
