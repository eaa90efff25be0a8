use std::process::ExitCode;

use anyhow::Result;

use crate::rdl::CompileFailed;

/// Exit code for a failed RDL compile.
pub const EXIT_COMPILE_FAILED: u8 = 1;

/// Exit code for every failure other than a compile failure. Matches the
/// code a Rust panic exits with.
pub const EXIT_UNHANDLED: u8 = 101;

/// How a finished run maps onto the process exit status.
///
/// Only [`CompileFailed`] is translated into a quiet exit; every other error
/// is unexpected and gets reported in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    CompileFailed,
    Unhandled,
}

impl Outcome {
    pub fn classify(result: &Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(err) if err.downcast_ref::<CompileFailed>().is_some() => Outcome::CompileFailed,
            Err(_) => Outcome::Unhandled,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::CompileFailed => EXIT_COMPILE_FAILED,
            Outcome::Unhandled => EXIT_UNHANDLED,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.code())
    }
}
