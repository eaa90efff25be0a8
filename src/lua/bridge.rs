use anyhow::{Context, Result};
use mlua::{Error as LuaError, Lua, LuaSerdeExt, Table, Value};

use crate::rdl::CompileFailed;

/// Looks through mlua's callback wrapping for a [`CompileFailed`] raised by
/// a host function such as `rdl.fail`.
pub fn find_compile_failure(err: &LuaError) -> Option<&CompileFailed> {
    match err {
        LuaError::CallbackError { cause, .. } => find_compile_failure(cause),
        LuaError::WithContext { cause, .. } => find_compile_failure(cause),
        LuaError::ExternalError(inner) => inner.downcast_ref::<CompileFailed>(),
        _ => None,
    }
}

pub fn strings_to_lua_table<'s>(
    lua: &Lua,
    items: impl IntoIterator<Item = &'s str>,
    key: &str,
) -> Result<Table> {
    let table = lua
        .create_table()
        .with_context(|| format!("Failed to create Lua table for '{}'", key))?;

    for (i, item) in items.into_iter().enumerate() {
        table
            .set(i + 1, item)
            .with_context(|| format!("Failed to set '{}' entry at index {}", key, i))?;
    }

    Ok(table)
}

pub fn toml_table_to_lua(lua: &Lua, settings: Option<&toml::Table>) -> Result<Value> {
    match settings {
        Some(settings) => lua
            .to_value(settings)
            .context("Failed to convert exporter settings to Lua"),
        None => Ok(Value::Table(lua.create_table()?)),
    }
}
