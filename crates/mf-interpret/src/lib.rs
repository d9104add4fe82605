//! mapforge interpreter
//!
//! Lowers generated mapping programs into closures that can be invoked any
//! number of times, together with the runtime coercions and keyed container
//! primitives those closures call.

pub mod coerce;
pub mod compile;
pub mod error;
pub mod intrinsics;

pub use compile::{compile_program, CompiledProgram};
