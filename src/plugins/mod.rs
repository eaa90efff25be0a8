mod arg_spec;
mod discovery;
mod exporter;

pub use arg_spec::{ArgSpec, ArgSpecError, validate_arg_specs};
pub use discovery::{LuaPluginDiscovery, PluginDiscovery};
pub use exporter::{ExporterPlugin, PLUGIN_FILE_NAME};
