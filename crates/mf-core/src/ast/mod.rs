//! Intermediate representation for generated mapping programs.
//!
//! `Ty` describes static shapes, `Value` describes runtime data and `Expr`
//! is the program tree the generators emit and the interpreter lowers.

mod expr;
pub mod pretty;
mod ty;
mod value;

pub use expr::*;
pub use ty::*;
pub use value::*;
