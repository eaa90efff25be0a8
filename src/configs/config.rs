use std::{collections::HashMap, fs, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default log verbosity; `$PEAKRDL_LOG` takes precedence.
    pub log_level: String,
    /// Extra directories scanned for exporter plugins, after the default ones.
    pub plugin_paths: Vec<PathBuf>,
    /// Discovered plugins that are not registered.
    pub disabled_plugins: Vec<String>,
    /// Per-exporter settings, handed to the plugin named by the key.
    pub exporters: HashMap<String, toml::Table>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: String::from("warn"),
            plugin_paths: Vec::new(),
            disabled_plugins: Vec::new(),
            exporters: HashMap::default(),
        }
    }
}

impl Config {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .with_context(|| format!("Invalid log_level '{}'", self.log_level))
    }

    pub fn exporter_settings(&self, name: &str) -> Option<&toml::Table> {
        self.exporters.get(name)
    }
}

pub fn load_config(config_path: PathBuf) -> Result<Config> {
    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {:?}", config_path))?;

    let config: Config =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", config_path))?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    config.level_filter()?;

    for name in &config.disabled_plugins {
        ensure!(
            !name.trim().is_empty(),
            "disabled_plugins must not contain empty names"
        );
    }

    for name in config.exporters.keys() {
        ensure!(
            !name.trim().is_empty(),
            "exporter settings table must have a non-empty name"
        );
    }

    Ok(())
}
