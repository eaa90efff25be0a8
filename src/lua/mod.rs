mod bridge;
mod runtime;
mod stdlib;

pub(crate) use bridge::{find_compile_failure, strings_to_lua_table, toml_table_to_lua};
pub use runtime::create_lua_vm;
pub use stdlib::RDL_TABLE;
