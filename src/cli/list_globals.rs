use anyhow::Result;
use clap::{ArgMatches, Args as _, Command, FromArgMatches as _};

use crate::{
    cli::ListGlobalsArgs,
    commands::{RunContext, Subcommand},
    rdl::Compiler,
};

/// Lists every definition in the root namespace of the inputs.
pub struct ListGlobals;

impl Subcommand for ListGlobals {
    fn name(&self) -> &str {
        "list-globals"
    }

    fn register(&self, parser: Command) -> Command {
        let command = Command::new(self.name().to_string())
            .about("Dump a list of all global type definitions found in the input files");
        parser.subcommand(ListGlobalsArgs::augment_args(command))
    }

    fn run(&self, matches: &ArgMatches, _ctx: &RunContext) -> Result<()> {
        let args = ListGlobalsArgs::from_arg_matches(matches)?;
        let design = Compiler::new(args.into()).compile()?;

        for component in &design.globals {
            println!("{} {}", component.kind, component.display_name());
        }

        Ok(())
    }
}
