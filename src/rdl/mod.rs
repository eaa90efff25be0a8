//! Structural SystemRDL front-end.
//!
//! Recovers definitions and instantiations from RDL sources, resolving
//! `` `include `` directives. Property semantics and elaboration are not
//! evaluated.

mod compiler;
mod design;
mod diagnostics;
mod error;
pub mod lexer;
mod parser;

pub use compiler::{CompileOptions, Compiler};
pub use design::{Component, ComponentKind, Design, Instance};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CompileFailed;
pub use parser::Parser;
