use anyhow::{Context, Result, anyhow};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::configs::Config;

const PEAKRDL_CONFIG_NAME: &str = "peakrdl.toml";
const PEAKRDL_APP_NAME: &str = "peakrdl";
const PEAKRDL_CONFIG_ENV: &str = "PEAKRDL_CFG";
const PLUGINS_DIR_NAME: &str = "plugins";
const CONFIG_FLAG: &str = "--peakrdl-cfg";

/// Expands `~`, `$VAR` and `${VAR}` in a path.
///
/// ```no_run
/// use std::path::PathBuf;
/// use peakrdl::configs::expand_path;
///
/// # fn main() -> anyhow::Result<()> {
/// let exporters = expand_path(PathBuf::from("~/rdl/exporters"))?;
/// # Ok(())
/// # }
/// ```
pub fn expand_path(path: PathBuf) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .context("Path contains invalid UTF-8 characters")?;

    let expanded = shellexpand::full(path_str).context("Failed to expand path")?;

    Ok(PathBuf::from(expanded.as_ref()))
}

/// `$XDG_CONFIG_HOME/peakrdl`, falling back to `~/.config/peakrdl`.
pub fn get_default_config_dir() -> Result<PathBuf> {
    xdg_app_dir("XDG_CONFIG_HOME", &[".config"])
}

/// `$XDG_DATA_HOME/peakrdl`, falling back to `~/.local/share/peakrdl`.
pub fn get_default_data_dir() -> Result<PathBuf> {
    xdg_app_dir("XDG_DATA_HOME", &[".local", "share"])
}

// An empty or relative XDG variable counts as unset, as the XDG base
// directory rules require. The home fallback is used on every platform.
fn xdg_app_dir(var: &str, home_fallback: &[&str]) -> Result<PathBuf> {
    if let Ok(value) = env::var(var)
        && !value.is_empty()
    {
        let path = PathBuf::from(value);
        if path.is_absolute() {
            return Ok(path.join(PEAKRDL_APP_NAME));
        }
    }

    dirs::home_dir()
        .map(|home| {
            home_fallback
                .iter()
                .fold(home, |dir, segment| dir.join(segment))
                .join(PEAKRDL_APP_NAME)
        })
        .context("Failed to determine home directory")
}

/// Finds the config file using the following search order:
///
/// 1. CLI argument path (if provided) - returns error if specified but doesn't exist
/// 2. `$PEAKRDL_CFG` - returns error if set but doesn't exist
/// 3. Current directory: `./peakrdl.toml`
/// 4. XDG config directory: `~/.config/peakrdl/peakrdl.toml`
///
/// Returns `Ok(None)` if nothing was found via auto-discovery.
pub fn find_config_file(cli_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = cli_path {
        if path.exists() {
            return Ok(Some(path));
        } else {
            return Err(anyhow!("Specified config file does not exist: {:?}", path));
        }
    }

    if let Ok(env_path) = env::var(PEAKRDL_CONFIG_ENV)
        && !env_path.is_empty()
    {
        let path = expand_path(PathBuf::from(env_path))?;
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(anyhow!(
            "Config file named by {} does not exist: {:?}",
            PEAKRDL_CONFIG_ENV,
            path
        ));
    }

    let local_config_path = PathBuf::from(".").join(PEAKRDL_CONFIG_NAME);
    if local_config_path.exists() {
        return Ok(Some(local_config_path));
    }

    let xdg_config_path = get_default_config_dir()?.join(PEAKRDL_CONFIG_NAME);
    if xdg_config_path.exists() {
        return Ok(Some(xdg_config_path));
    }

    Ok(None)
}

/// Extracts the `--peakrdl-cfg` value from raw process arguments.
///
/// The config decides which plugins exist, so it has to be known before the
/// full parser can be assembled. Both `--peakrdl-cfg PATH` and
/// `--peakrdl-cfg=PATH` are accepted; the last occurrence wins.
pub fn config_path_from_args(args: &[OsString]) -> Option<PathBuf> {
    let mut found = None;
    let mut iter = args.iter().skip(1);

    while let Some(arg) = iter.next() {
        let Some(arg) = arg.to_str() else {
            continue;
        };
        if arg == "--" {
            break;
        }
        if arg == CONFIG_FLAG {
            found = iter.next().map(PathBuf::from);
        } else if let Some(value) = arg
            .strip_prefix(CONFIG_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            found = Some(PathBuf::from(value));
        }
    }

    found
}

/// Returns the plugin directories in search order: config dir, data dir,
/// then the `plugin_paths` from the config file.
pub fn resolve_plugin_paths(config: &Config) -> Result<Vec<PathBuf>> {
    let mut paths = vec![
        get_default_config_dir()?.join(PLUGINS_DIR_NAME),
        get_default_data_dir()?.join(PLUGINS_DIR_NAME),
    ];

    for extra in &config.plugin_paths {
        let expanded = expand_path(extra.clone())
            .with_context(|| format!("Failed to expand plugin path {:?}", extra))?;
        if !paths.contains(&expanded) {
            paths.push(expanded);
        }
    }

    Ok(paths)
}
