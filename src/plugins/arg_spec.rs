use std::collections::HashSet;

use clap::{Arg, ArgAction, builder::PossibleValuesParser, value_parser};
use serde::Deserialize;
use thiserror::Error;

use crate::commands::CONFIG_ARG;

/// Argument ids claimed by the front-end itself.
const RESERVED_NAMES: &[&str] = &["help", CONFIG_ARG];
const RESERVED_LONGS: &[&str] = &["help", "peakrdl-cfg"];
const RESERVED_SHORTS: &[char] = &['h'];

/// Ids and flags added by `compile_args = true`.
const COMPILE_NAMES: &[&str] = &["input_files", "incdirs", "top"];
const COMPILE_LONGS: &[&str] = &["top"];
const COMPILE_SHORTS: &[char] = &['I', 't'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgSpecError {
    #[error("argument name must not be empty")]
    EmptyName,

    #[error("argument '{0}' is declared more than once")]
    DuplicateName(String),

    #[error("argument name '{0}' is reserved")]
    ReservedName(String),

    #[error("argument '{name}' uses option '{option}', which is reserved or already taken")]
    OptionTaken { name: String, option: String },

    #[error("argument '{name}' has an invalid long option '{long}'")]
    InvalidLong { name: String, long: String },

    #[error("argument '{name}' has an invalid short option '{short}'")]
    InvalidShort { name: String, short: char },

    #[error("argument '{name}': {reason}")]
    Invalid { name: String, reason: &'static str },
}

/// One argument declared by an exporter plugin's `args` table.
///
/// ```lua
/// args = {
///     { name = "out", short = "o", value_name = "FILE", required = true },
///     { name = "verbose", flag = true, help = "Chatty output" },
///     { name = "style", choices = { "compact", "full" }, default = "full" },
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArgSpec {
    pub name: String,
    pub long: Option<String>,
    pub short: Option<char>,
    pub help: Option<String>,
    pub value_name: Option<String>,
    pub required: bool,
    pub flag: bool,
    pub multiple: bool,
    pub positional: bool,
    pub choices: Vec<String>,
    pub default: Option<String>,
}

impl ArgSpec {
    fn invalid(&self, reason: &'static str) -> ArgSpecError {
        ArgSpecError::Invalid {
            name: self.name.clone(),
            reason,
        }
    }

    fn check_shape(&self) -> Result<(), ArgSpecError> {
        if self.flag
            && (self.multiple
                || self.required
                || self.positional
                || self.value_name.is_some()
                || self.default.is_some()
                || !self.choices.is_empty())
        {
            return Err(self.invalid(
                "a flag takes no value and cannot be required, positional or multiple",
            ));
        }
        if self.positional && (self.long.is_some() || self.short.is_some()) {
            return Err(self.invalid("a positional argument cannot have 'long' or 'short'"));
        }
        if let Some(default) = &self.default
            && !self.choices.is_empty()
            && !self.choices.contains(default)
        {
            return Err(self.invalid("'default' must be one of 'choices'"));
        }
        Ok(())
    }

    /// Option names clap would reject or misparse: a long with a leading `-`,
    /// `=` or whitespace, a short of `-` or whitespace.
    fn check_option_names(&self) -> Result<(), ArgSpecError> {
        if let Some(long) = &self.long
            && (long.is_empty()
                || long.starts_with('-')
                || long.contains('=')
                || long.chars().any(char::is_whitespace))
        {
            return Err(ArgSpecError::InvalidLong {
                name: self.name.clone(),
                long: long.clone(),
            });
        }
        if let Some(short) = self.short
            && (short == '-' || short.is_whitespace())
        {
            return Err(ArgSpecError::InvalidShort {
                name: self.name.clone(),
                short,
            });
        }
        Ok(())
    }

    /// Builds the clap argument; the spec must have been validated.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone());

        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        if let Some(short) = self.short {
            arg = arg.short(short);
        }

        if self.flag {
            return arg.action(ArgAction::SetTrue);
        }

        arg = match (self.multiple, self.positional) {
            (true, true) => arg.action(ArgAction::Append).num_args(1..),
            (true, false) => arg.action(ArgAction::Append),
            (false, _) => arg.action(ArgAction::Set),
        };

        if let Some(value_name) = &self.value_name {
            arg = arg.value_name(value_name.clone());
        }
        if self.choices.is_empty() {
            arg = arg.value_parser(value_parser!(String));
        } else {
            arg = arg.value_parser(PossibleValuesParser::new(self.choices.clone()));
        }
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }

        arg.required(self.required)
    }
}

/// Normalizes and validates a plugin's argument list.
///
/// Options without `long` or `short` get `long = name` with `_` turned into
/// `-`. Rejects anything clap would refuse at parser-assembly time, so a bad
/// plugin fails discovery instead of aborting inside clap.
pub fn validate_arg_specs(
    mut specs: Vec<ArgSpec>,
    compile_args: bool,
) -> Result<Vec<ArgSpec>, ArgSpecError> {
    let mut names: HashSet<String> = HashSet::new();
    let mut longs: HashSet<String> = RESERVED_LONGS.iter().map(|s| s.to_string()).collect();
    let mut shorts: HashSet<char> = RESERVED_SHORTS.iter().copied().collect();
    let mut reserved_names: Vec<&str> = RESERVED_NAMES.to_vec();
    if compile_args {
        reserved_names.extend_from_slice(COMPILE_NAMES);
        longs.extend(COMPILE_LONGS.iter().map(|s| s.to_string()));
        shorts.extend(COMPILE_SHORTS.iter().copied());
    }

    let mut seen_optional_positional = false;
    let mut seen_multiple_positional = false;

    for spec in &mut specs {
        spec.name = spec.name.trim().to_string();
        if spec.name.is_empty() {
            return Err(ArgSpecError::EmptyName);
        }
        if reserved_names.contains(&spec.name.as_str()) {
            return Err(ArgSpecError::ReservedName(spec.name.clone()));
        }
        if !names.insert(spec.name.clone()) {
            return Err(ArgSpecError::DuplicateName(spec.name.clone()));
        }

        spec.check_shape()?;

        if spec.positional {
            if compile_args {
                return Err(spec.invalid(
                    "positional arguments cannot be combined with compile_args",
                ));
            }
            if seen_multiple_positional {
                return Err(spec.invalid(
                    "only the last positional argument may take multiple values",
                ));
            }
            if spec.required && seen_optional_positional {
                return Err(spec.invalid(
                    "a required positional argument cannot follow an optional one",
                ));
            }
            seen_optional_positional |= !spec.required;
            seen_multiple_positional |= spec.multiple;
            continue;
        }

        if spec.long.is_none() && spec.short.is_none() {
            spec.long = Some(spec.name.replace('_', "-"));
        }
        spec.check_option_names()?;
        if let Some(long) = &spec.long
            && !longs.insert(long.clone())
        {
            return Err(ArgSpecError::OptionTaken {
                name: spec.name.clone(),
                option: format!("--{}", long),
            });
        }
        if let Some(short) = spec.short
            && !shorts.insert(short)
        {
            return Err(ArgSpecError::OptionTaken {
                name: spec.name.clone(),
                option: format!("-{}", short),
            });
        }
    }

    Ok(specs)
}
