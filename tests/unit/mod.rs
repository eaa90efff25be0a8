//! Unit tests for the peakrdl library API
//!
//! These exercise the registry, dispatcher and front-end without spawning
//! the binary.

mod compiler_test;
mod dispatcher_test;
