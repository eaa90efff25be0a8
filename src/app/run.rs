use std::{env, ffi::OsString, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use tracing::debug;

use crate::{
    app::Outcome,
    cli::builtin_subcommands,
    commands::{Dispatcher, Registry},
    configs::{
        Config, config_path_from_args, expand_path, find_config_file, load_config,
        validate_config,
    },
    logging::init_logging,
    plugins::{LuaPluginDiscovery, PluginDiscovery},
};

/// Main entry point for the `peakrdl` binary.
///
/// Runs the whole lifecycle and turns its result into the process exit
/// status:
///
/// 1. **Load config**: `--peakrdl-cfg`, `$PEAKRDL_CFG`, `./peakrdl.toml`, XDG
/// 2. **Discover plugins**: Lua exporters from the plugin directories
/// 3. **Build registry**: built-ins first, then plugins; duplicate names abort
/// 4. **Parse**: usage errors, `--help` and `--version` exit through clap;
///    `--version` is answered even when steps 1-3 failed
/// 5. **Dispatch**: runs exactly the selected subcommand
///
/// # Exit codes
///
/// - `0` on success (and for `--help`/`--version`)
/// - `1` when the subcommand failed with [`crate::rdl::CompileFailed`]; its
///   diagnostics were already printed, nothing else is added
/// - `2` for malformed invocations, reported by clap
/// - `101` for anything else, with the full error chain on stderr
pub fn run() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();
    let result = run_with_args(args);
    let outcome = Outcome::classify(&result);

    if let (Outcome::Unhandled, Err(err)) = (outcome, &result) {
        eprintln!("Error: {:?}", err);
    }

    outcome.into()
}

/// Runs with explicit process arguments (including the binary name).
///
/// Parse failures exit the process through [`clap::Error::exit`].
pub fn run_with_args(args: Vec<OsString>) -> Result<()> {
    let (config, dispatcher) = match prepare(&args) {
        Ok(ready) => ready,
        Err(err) => {
            exit_if_version_requested(&args);
            return Err(err);
        }
    };

    let matches = match dispatcher.parse(args) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };

    dispatcher.dispatch(&matches, &config)
}

// Everything that has to succeed before the full parser exists.
fn prepare(args: &[OsString]) -> Result<(Config, Dispatcher)> {
    let config = handle_config(config_path_from_args(args))?;

    init_logging(config.level_filter()?);

    let discovery = LuaPluginDiscovery::from_config(&config)?;
    let dispatcher = build_dispatcher(&discovery)?;

    Ok((config, dispatcher))
}

// `--version` does not depend on config or plugins, so it still answers when
// startup failed. Plugins are unknown here; only built-ins are registered.
fn exit_if_version_requested(args: &[OsString]) {
    let Ok(registry) = Registry::build(builtin_subcommands(), Vec::new()) else {
        return;
    };

    if let Err(err) = Dispatcher::new(registry).parse(args.iter().cloned())
        && err.kind() == ErrorKind::DisplayVersion
    {
        err.exit();
    }
}

/// Collects built-ins and discovered plugins into a ready dispatcher.
///
/// Fails before any argument parsing if discovery fails or two subcommands
/// share a name.
pub fn build_dispatcher(discovery: &dyn PluginDiscovery) -> Result<Dispatcher> {
    let plugins = discovery.discover().context("Failed to discover exporter plugins")?;
    debug!(count = plugins.len(), "discovered plugins");

    let registry = Registry::build(builtin_subcommands(), plugins)?;
    debug!(subcommands = ?registry.names().collect::<Vec<_>>(), "registry built");

    Ok(Dispatcher::new(registry))
}

// Loads and validates the config file; falls back to defaults when none is
// found through auto-discovery.
fn handle_config(cli_path: Option<PathBuf>) -> Result<Config> {
    let expanded_config = cli_path
        .map(expand_path)
        .transpose()
        .context("Failed to expand config path")?;

    let config = match find_config_file(expanded_config).context("Failed to find config file")? {
        Some(path) => load_config(path).context("Failed to load config file")?,
        None => Config::default(),
    };

    validate_config(&config)?;

    Ok(config)
}
