use std::{ffi::OsString, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use tracing::info;

use crate::{
    commands::{Registry, RunContext},
    configs::Config,
};

pub const BIN_NAME: &str = "peakrdl";
pub const CONFIG_ARG: &str = "peakrdl_cfg";

const DESCRIPTION: &str = "Generate outputs from SystemRDL register descriptions.\n\n\
Each subcommand is either built in or contributed by an exporter plugin.";

/// Assembles the top-level parser with one sub-parser per registered
/// subcommand.
pub fn build_parser(registry: &Registry) -> Command {
    let parser = Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about(DESCRIPTION)
        .subcommand_required(true)
        .disable_help_subcommand(true)
        .subcommand_value_name("subcommand")
        .subcommand_help_heading("Subcommands")
        .arg(
            Arg::new(CONFIG_ARG)
                .long("peakrdl-cfg")
                .value_name("CFG")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Specify a PeakRDL configuration TOML file"),
        );

    registry
        .iter()
        .fold(parser, |parser, subcommand| subcommand.register(parser))
}

/// Parses arguments and runs the selected subcommand.
pub struct Dispatcher {
    registry: Registry,
    parser: Command,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        let parser = build_parser(&registry);
        Self { registry, parser }
    }

    pub fn parser(&self) -> &Command {
        &self.parser
    }

    /// Parses `args` (including the binary name) without exiting the process.
    ///
    /// Help, version and usage errors all come back as a [`clap::Error`];
    /// the caller decides whether to call [`clap::Error::exit`].
    pub fn parse<I, T>(&self, args: I) -> Result<ArgMatches, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.parser.clone().try_get_matches_from(args)
    }

    /// Runs exactly the subcommand selected in `matches`.
    pub fn dispatch(&self, matches: &ArgMatches, config: &Config) -> Result<()> {
        let (name, sub_matches) = matches
            .subcommand()
            .context("No subcommand was selected")?;

        let subcommand = self
            .registry
            .get(name)
            .with_context(|| format!("Subcommand '{}' is not registered", name))?;

        info!(subcommand = name, "running");

        let ctx = RunContext {
            cli: &self.parser,
            config,
        };
        subcommand.run(sub_matches, &ctx)
    }
}
