use anyhow::Result;
use mlua::{Lua, LuaOptions, StdLib, Table};

use crate::lua::stdlib::register_rdl_stdlib;

/// Creates the sandboxed VM shared by every exporter plugin.
///
/// Only the safe standard libraries are loaded, and `os.exit`/`os.execute`
/// are removed so a plugin cannot end or fork the process behind the
/// dispatcher's back.
pub fn create_lua_vm() -> Result<Lua> {
    let lua = Lua::new_with(StdLib::ALL_SAFE, LuaOptions::default())?;

    let os_table: Table = lua.globals().get("os")?;
    os_table.raw_remove("exit")?;
    os_table.raw_remove("execute")?;
    lua.globals().set("os", os_table)?;

    register_rdl_stdlib(&lua)?;

    Ok(lua)
}
