//! Generation of dictionary mapping programs: settings and name matching,
//! member enumeration, the dictionary adapter and the adapter registry that
//! compiles and caches programs.

pub mod adapter;
pub mod argument;
pub mod config;
pub mod convert;
pub mod dictionary;
pub mod members;
pub mod settings;
pub mod shape;

pub use adapter::TypeAdapter;
pub use argument::CompileArgument;
pub use config::{CompiledMapping, TypeAdapterConfig};
pub use dictionary::DictionaryAdapter;
pub use settings::{MapKind, NameMatchingStrategy, TypeAdapterSettings};
