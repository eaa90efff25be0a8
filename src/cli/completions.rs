use std::io;

use anyhow::Result;
use clap::{ArgMatches, Args as _, Command, FromArgMatches as _};
use clap_complete::generate;

use crate::{
    cli::CompletionsArgs,
    commands::{BIN_NAME, RunContext, Subcommand},
};

/// Generates shell completion scripts to stdout
///
/// The script covers every registered subcommand, plugins included, so it
/// should be regenerated after installing or removing exporters.
///
/// ```bash
/// # Zsh
/// peakrdl completions zsh > ~/.zfunc/_peakrdl
///
/// # Bash
/// peakrdl completions bash > ~/.local/share/bash-completion/completions/peakrdl
/// ```
pub struct Completions;

impl Subcommand for Completions {
    fn name(&self) -> &str {
        "completions"
    }

    fn register(&self, parser: Command) -> Command {
        let command = Command::new(self.name().to_string()).about("Generate shell completions");
        parser.subcommand(CompletionsArgs::augment_args(command))
    }

    fn run(&self, matches: &ArgMatches, ctx: &RunContext) -> Result<()> {
        let args = CompletionsArgs::from_arg_matches(matches)?;
        let mut cli = ctx.cli.clone();
        generate(args.shell, &mut cli, BIN_NAME, &mut io::stdout());
        Ok(())
    }
}
