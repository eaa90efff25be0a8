use std::path::PathBuf;

use mlua::{Error as LuaError, Lua, LuaSerdeExt, Result as LuaResult, SerializeOptions, Table};
use tracing::{info, warn};

use crate::rdl::{CompileFailed, CompileOptions, Compiler, Diagnostics};

/// Name of the global table holding the host API.
pub const RDL_TABLE: &str = "rdl";

pub fn register_rdl_stdlib(lua: &Lua) -> LuaResult<()> {
    let rdl_table = lua.create_table()?;

    rdl_table.set("version", env!("CARGO_PKG_VERSION"))?;

    // compile(options) -> design table. Accepts the options table an exporter
    // receives when it declares compile_args.
    let compile_fn = lua.create_function(|lua, options: Table| {
        let options = compile_options_from_table(&options)?;
        let design = Compiler::new(options)
            .compile()
            .map_err(LuaError::external)?;

        lua.to_value_with(
            &design,
            SerializeOptions::new()
                .serialize_none_to_null(false)
                .serialize_unit_to_null(false),
        )
    })?;
    rdl_table.set("compile", compile_fn)?;

    // fail(message): report an error and abort the run as a compile failure
    let fail_fn = lua.create_function(|_, message: String| -> LuaResult<()> {
        Diagnostics::default().fatal(message);
        Err(LuaError::external(CompileFailed::new(1)))
    })?;
    rdl_table.set("fail", fail_fn)?;

    let warn_fn = lua.create_function(|_, message: String| {
        warn!("{}", message);
        Ok(())
    })?;
    rdl_table.set("warn", warn_fn)?;

    let info_fn = lua.create_function(|_, message: String| {
        info!("{}", message);
        Ok(())
    })?;
    rdl_table.set("info", info_fn)?;

    lua.globals().set(RDL_TABLE, rdl_table)?;
    Ok(())
}

fn compile_options_from_table(options: &Table) -> LuaResult<CompileOptions> {
    let input_files: Vec<String> = options
        .get::<Option<Vec<String>>>("input_files")?
        .ok_or_else(|| LuaError::external("rdl.compile requires 'input_files'"))?;
    let incdirs: Vec<String> = options
        .get::<Option<Vec<String>>>("incdirs")?
        .unwrap_or_default();
    let top: Option<String> = options.get("top")?;

    Ok(CompileOptions {
        input_files: input_files.into_iter().map(PathBuf::from).collect(),
        incdirs: incdirs.into_iter().map(PathBuf::from).collect(),
        top,
    })
}
