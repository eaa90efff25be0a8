mod args;
pub mod completions;
pub mod dump;
pub mod list_globals;

pub use args::{CompileArgs, CompletionsArgs, DumpArgs, ListGlobalsArgs};
pub use completions::Completions;
pub use dump::Dump;
pub use list_globals::ListGlobals;

use crate::commands::Subcommand;

/// The subcommands every installation has, in help-text order.
pub fn builtin_subcommands() -> Vec<Box<dyn Subcommand>> {
    vec![Box::new(Dump), Box::new(ListGlobals), Box::new(Completions)]
}
