//! Configuration for the condition engine
//!
//! Compile-time bounds are security boundaries and cannot be modified at
//! runtime; runtime preferences come from `REQSCRIPT_*` environment
//! variables.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
