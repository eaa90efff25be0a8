pub mod app;
pub mod cli;
pub mod commands;
pub mod configs;
pub mod logging;
pub mod lua;
pub mod plugins;
pub mod rdl;

pub use app::{Outcome, run};
pub use commands::{Dispatcher, Registry, RunContext, Subcommand};
pub use configs::Config;
pub use plugins::{LuaPluginDiscovery, PluginDiscovery};
pub use rdl::CompileFailed;
