use std::fs;

use anyhow::{Context, Result};
use clap::{ArgMatches, Args as _, Command, FromArgMatches as _};

use crate::{
    cli::DumpArgs,
    commands::{RunContext, Subcommand},
    rdl::{CompileFailed, Compiler, Diagnostics},
};

/// Dumps the component tree of the top-level addrmap.
pub struct Dump;

impl Subcommand for Dump {
    fn name(&self) -> &str {
        "dump"
    }

    fn register(&self, parser: Command) -> Command {
        let command = Command::new(self.name().to_string())
            .about("Dump the component tree of the compiled top-level addrmap");
        parser.subcommand(DumpArgs::augment_args(command))
    }

    fn run(&self, matches: &ArgMatches, _ctx: &RunContext) -> Result<()> {
        let args = DumpArgs::from_arg_matches(matches)?;
        let design = Compiler::new(args.compile.into()).compile()?;

        let Some(top) = design.top else {
            Diagnostics::default().fatal("no addrmap definition found in the root namespace");
            return Err(CompileFailed::new(1).into());
        };

        let rendered = if args.json {
            let mut json =
                serde_json::to_string_pretty(&top).context("Failed to serialize component tree")?;
            json.push('\n');
            json
        } else {
            top.render_tree()
        };

        match args.output {
            Some(path) => fs::write(&path, rendered)
                .with_context(|| format!("Failed to write dump to {:?}", path))?,
            None => print!("{}", rendered),
        }

        Ok(())
    }
}
