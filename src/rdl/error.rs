use thiserror::Error;

/// Raised when RDL input could not be compiled.
///
/// The diagnostics that caused it have already been printed by the time this
/// error exists, so the entry point maps it to exit code 1 without adding
/// anything to the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("RDL compilation failed with {errors} error(s)")]
pub struct CompileFailed {
    pub errors: usize,
}

impl CompileFailed {
    pub fn new(errors: usize) -> Self {
        Self {
            errors: errors.max(1),
        }
    }
}
