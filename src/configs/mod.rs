mod config;
pub mod paths;

pub use config::{Config, load_config, validate_config};
pub use paths::{
    config_path_from_args, expand_path, find_config_file, get_default_config_dir,
    get_default_data_dir, resolve_plugin_paths,
};
