use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{Context, Result, bail};
use clap::{ArgMatches, Args as _, Command, FromArgMatches as _};
use mlua::{Error as LuaError, Function, Lua, LuaSerdeExt, Table, Value};
use semver::Version;

use crate::{
    cli::CompileArgs,
    commands::{RunContext, Subcommand},
    lua::{find_compile_failure, strings_to_lua_table, toml_table_to_lua},
    plugins::{ArgSpec, validate_arg_specs},
};

pub const PLUGIN_FILE_NAME: &str = "plugin.lua";

/// An exporter subcommand backed by a Lua `plugin.lua`.
///
/// ```lua
/// return {
///     name = "regcount",
///     description = "Count registers in the top-level addrmap",
///     version = "1.0.0",
///     compile_args = true,
///     args = { { name = "out", short = "o", required = true } },
///     run = function(options, settings)
///         local design = rdl.compile(options)
///         -- ...
///     end,
/// }
/// ```
pub struct ExporterPlugin {
    name: String,
    description: Option<String>,
    version: Option<Version>,
    path: PathBuf,
    compile_args: bool,
    args: Vec<ArgSpec>,
    run_fn: Function,
    lua: Rc<Lua>,
}

impl ExporterPlugin {
    /// Evaluates a `plugin.lua` file and builds the exporter from the table it
    /// returns.
    pub fn load(lua: Rc<Lua>, path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin file '{}'", path.display()))?;

        let chunk_name = path
            .to_str()
            .with_context(|| format!("Plugin path contains invalid UTF-8: {}", path.display()))?;

        let table: Table = lua
            .load(&contents)
            .set_name(chunk_name)
            .eval()
            .with_context(|| format!("Failed to evaluate plugin '{}'", path.display()))?;

        Self::from_table(lua, table, path.to_path_buf())
    }

    pub fn from_table(lua: Rc<Lua>, table: Table, path: PathBuf) -> Result<Self> {
        let name = table
            .get::<Option<String>>("name")
            .with_context(|| format!("Plugin '{}' has a non-string 'name'", path.display()))?
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .with_context(|| format!("Plugin '{}' is missing 'name'", path.display()))?;

        let description: Option<String> = table
            .get("description")
            .with_context(|| format!("Plugin '{}' has a non-string 'description'", name))?;

        let version = table
            .get::<Option<String>>("version")
            .with_context(|| format!("Plugin '{}' has a non-string 'version'", name))?
            .map(|version| {
                Version::parse(&version).with_context(|| {
                    format!(
                        "Plugin '{}' version '{}' is not valid semver",
                        name, version
                    )
                })
            })
            .transpose()?;

        let compile_args = table
            .get::<Option<bool>>("compile_args")
            .with_context(|| format!("Plugin '{}' has a non-boolean 'compile_args'", name))?
            .unwrap_or(false);

        let run_fn = match table.get::<Value>("run")? {
            Value::Function(run_fn) => run_fn,
            _ => bail!("Plugin '{}' must define a 'run' function", name),
        };

        let args: Vec<ArgSpec> = match table.get::<Value>("args")? {
            Value::Nil => Vec::new(),
            value => lua
                .from_value(value)
                .with_context(|| format!("Plugin '{}' has a malformed 'args' table", name))?,
        };
        let args = validate_arg_specs(args, compile_args)
            .with_context(|| format!("Plugin '{}' declares invalid arguments", name))?;

        Ok(Self {
            name,
            description,
            version,
            path,
            compile_args,
            args,
            run_fn,
            lua,
        })
    }

    fn options_table(&self, matches: &ArgMatches) -> Result<Table> {
        let lua = &self.lua;
        let options = lua.create_table()?;

        if self.compile_args {
            let compile = CompileArgs::from_arg_matches(matches)?;
            let inputs: Vec<String> = compile
                .input_files
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            let incdirs: Vec<String> = compile
                .incdirs
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            options.set(
                "input_files",
                strings_to_lua_table(lua, inputs.iter().map(String::as_str), "input_files")?,
            )?;
            options.set(
                "incdirs",
                strings_to_lua_table(lua, incdirs.iter().map(String::as_str), "incdirs")?,
            )?;
            options.set("top", compile.top)?;
        }

        for spec in &self.args {
            let value = if spec.flag {
                Value::Boolean(matches.get_flag(&spec.name))
            } else if spec.multiple {
                match matches.get_many::<String>(&spec.name) {
                    Some(values) => Value::Table(strings_to_lua_table(
                        lua,
                        values.map(String::as_str),
                        &spec.name,
                    )?),
                    None => Value::Nil,
                }
            } else {
                match matches.get_one::<String>(&spec.name) {
                    Some(value) => Value::String(lua.create_string(value)?),
                    None => Value::Nil,
                }
            };
            options.set(spec.name.as_str(), value)?;
        }

        Ok(options)
    }

    fn convert_error(&self, err: LuaError) -> anyhow::Error {
        match find_compile_failure(&err) {
            Some(failed) => failed.clone().into(),
            None => anyhow::Error::new(err).context(format!("Exporter '{}' failed", self.name)),
        }
    }
}

impl Subcommand for ExporterPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn register(&self, parser: Command) -> Command {
        let mut command = Command::new(self.name.clone());
        if let Some(description) = &self.description {
            command = command.about(description.clone());
        }
        if self.compile_args {
            command = CompileArgs::augment_args(command);
        }
        let command = self
            .args
            .iter()
            .fold(command, |command, spec| command.arg(spec.to_arg()));

        parser.subcommand(command)
    }

    fn run(&self, matches: &ArgMatches, ctx: &RunContext) -> Result<()> {
        let options = self.options_table(matches)?;
        let settings = toml_table_to_lua(&self.lua, ctx.config.exporter_settings(&self.name))?;

        self.run_fn
            .call::<()>((options, settings))
            .map_err(|err| self.convert_error(err))
    }

    fn origin(&self) -> String {
        match &self.version {
            Some(version) => format!(
                "exporter plugin '{}' v{} ({})",
                self.name,
                version,
                self.path.display()
            ),
            None => format!("exporter plugin '{}' ({})", self.name, self.path.display()),
        }
    }
}
