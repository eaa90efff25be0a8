use std::{fs, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use mlua::Lua;
use tracing::{debug, warn};

use crate::{
    commands::Subcommand,
    configs::{Config, resolve_plugin_paths},
    lua::create_lua_vm,
    plugins::{ExporterPlugin, PLUGIN_FILE_NAME},
};

/// Source of externally contributed exporter subcommands.
///
/// Keeping discovery behind this trait lets the registry and dispatcher be
/// exercised with in-memory subcommands.
pub trait PluginDiscovery {
    /// Returns the discovered subcommands in discovery order. Any failure
    /// aborts startup; broken plugins are never skipped silently.
    fn discover(&self) -> Result<Vec<Box<dyn Subcommand>>>;
}

/// Finds `<dir>/<plugin>/plugin.lua` files and loads them into one shared VM.
pub struct LuaPluginDiscovery {
    plugin_paths: Vec<PathBuf>,
    disabled: Vec<String>,
    lua: Rc<Lua>,
}

impl LuaPluginDiscovery {
    pub fn new(plugin_paths: Vec<PathBuf>, disabled: Vec<String>) -> Result<Self> {
        let lua = create_lua_vm().context("Failed to create Lua runtime")?;
        Ok(Self {
            plugin_paths,
            disabled,
            lua: Rc::new(lua),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let plugin_paths = resolve_plugin_paths(config).context("Failed to resolve plugin paths")?;
        Self::new(plugin_paths, config.disabled_plugins.clone())
    }

    /// Lists plugin files in directory order, entries sorted within each
    /// directory. Missing directories are skipped.
    pub fn find_plugin_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for plugin_dir_path in &self.plugin_paths {
            if !plugin_dir_path.is_dir() {
                debug!(path = %plugin_dir_path.display(), "plugin directory not present");
                continue;
            }

            let plugin_dir = fs::read_dir(plugin_dir_path).with_context(|| {
                format!(
                    "Failed to read plugins directory at: {}",
                    plugin_dir_path.display()
                )
            })?;

            let mut entries: Vec<_> = plugin_dir
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to read directory entries")?;
            entries.sort_by_key(|entry| entry.path());

            for entry in entries {
                let lua_plugin_path = entry.path().join(PLUGIN_FILE_NAME);
                if entry.path().is_dir() && lua_plugin_path.is_file() {
                    files.push(lua_plugin_path);
                }
            }
        }

        Ok(files)
    }
}

impl PluginDiscovery for LuaPluginDiscovery {
    fn discover(&self) -> Result<Vec<Box<dyn Subcommand>>> {
        let mut plugins: Vec<Box<dyn Subcommand>> = Vec::new();

        for path in self.find_plugin_files()? {
            let plugin = ExporterPlugin::load(Rc::clone(&self.lua), &path)
                .with_context(|| format!("Failed to load exporter plugin {:?}", path))?;

            if self.disabled.iter().any(|name| name == plugin.name()) {
                warn!(plugin = plugin.name(), "plugin disabled by configuration");
                continue;
            }

            debug!(plugin = plugin.name(), path = %path.display(), "discovered exporter plugin");
            plugins.push(Box::new(plugin));
        }

        Ok(plugins)
    }
}
