mod dispatcher;
mod registry;

pub use dispatcher::{BIN_NAME, CONFIG_ARG, Dispatcher, build_parser};
pub use registry::{Registry, RegistryError};

use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::configs::Config;

/// A named unit of CLI functionality, built-in or contributed by a plugin.
///
/// The registry and the dispatcher treat every implementation the same way.
pub trait Subcommand {
    /// Unique, non-empty name the subcommand is invoked by.
    fn name(&self) -> &str;

    /// Adds this command's sub-parser to `parser` and returns the result.
    ///
    /// Implementations call `parser.subcommand(...)` with a command named
    /// [`Subcommand::name`] and declare their own flags and positionals on it.
    fn register(&self, parser: Command) -> Command;

    /// Runs the command with its already-parsed sub-matches.
    ///
    /// Failing with [`crate::rdl::CompileFailed`] requests exit code 1. Any
    /// other error is treated as an unexpected fault.
    fn run(&self, matches: &ArgMatches, ctx: &RunContext) -> Result<()>;

    /// Describes where this subcommand came from, for conflict diagnostics.
    fn origin(&self) -> String {
        format!("built-in subcommand '{}'", self.name())
    }
}

/// Read-only state handed to [`Subcommand::run`].
pub struct RunContext<'a> {
    /// The fully assembled top-level parser.
    pub cli: &'a Command,
    pub config: &'a Config,
}
