use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

use crate::commands::Subcommand;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(
        "More than one exporter plugin was registered with the same name '{name}': \n\t{first}\n\t{second}"
    )]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid subcommand name '{name}' registered by {origin}: {reason}")]
    InvalidName {
        name: String,
        origin: String,
        reason: &'static str,
    },
}

/// Name-to-subcommand mapping built once at startup.
///
/// Iteration order is registration order: built-ins first, then plugins in
/// discovery order.
pub struct Registry {
    entries: IndexMap<String, Box<dyn Subcommand>>,
}

impl Registry {
    /// Merges built-in and discovered subcommands, rejecting invalid and
    /// duplicate names.
    pub fn build(
        builtins: Vec<Box<dyn Subcommand>>,
        plugins: Vec<Box<dyn Subcommand>>,
    ) -> Result<Self, RegistryError> {
        let mut entries: IndexMap<String, Box<dyn Subcommand>> = IndexMap::new();

        for subcommand in builtins.into_iter().chain(plugins) {
            let name = subcommand.name().to_string();
            validate_name(&name, subcommand.as_ref())?;

            if let Some(existing) = entries.get(&name) {
                return Err(RegistryError::DuplicateName {
                    name,
                    first: existing.origin(),
                    second: subcommand.origin(),
                });
            }

            debug!(name = %name, origin = %subcommand.origin(), "registered subcommand");
            entries.insert(name, subcommand);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&dyn Subcommand> {
        self.entries.get(name).map(Box::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Subcommand> {
        self.entries.values().map(Box::as_ref)
    }
}

fn validate_name(name: &str, subcommand: &dyn Subcommand) -> Result<(), RegistryError> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name.chars().any(char::is_whitespace) {
        "name must not contain whitespace"
    } else if name.starts_with('-') {
        "name must not start with '-'"
    } else {
        return Ok(());
    };

    Err(RegistryError::InvalidName {
        name: name.to_string(),
        origin: subcommand.origin(),
        reason,
    })
}
