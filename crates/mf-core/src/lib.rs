//! mapforge core: the intermediate representation shared by the mapping
//! program generators and the interpreter that executes them.

#[macro_use]
pub mod macros;

pub mod ast;
pub mod config;
pub mod error;
pub mod id;
pub mod names;
pub mod pretty;

// Re-export commonly used items for convenience
pub use tracing;

pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
