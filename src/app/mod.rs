pub mod exit_code;
mod run;

pub use exit_code::{EXIT_COMPILE_FAILED, EXIT_UNHANDLED, Outcome};
pub use run::{build_dispatcher, run, run_with_args};
