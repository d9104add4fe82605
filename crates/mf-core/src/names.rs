//! Member-name conversions used to derive dictionary keys.
//!
//! A converter is a pure `&str -> String` function. The built-in variants are
//! plain data so programs that embed them stay comparable and printable;
//! `Custom` wraps an arbitrary function under a display name.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[derive(Clone, Serialize, Deserialize)]
pub enum NameConverter {
    Identity,
    PascalCase,
    CamelCase,
    SnakeCase,
    LowerCase,
    #[serde(skip)]
    Custom(CustomNameConverter),
}

impl NameConverter {
    pub fn custom(
        name: impl Into<String>,
        func: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        NameConverter::Custom(CustomNameConverter {
            name: name.into(),
            func: Arc::new(func),
        })
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, NameConverter::Identity)
    }

    pub fn convert(&self, name: &str) -> String {
        match self {
            NameConverter::Identity => name.to_string(),
            NameConverter::PascalCase => name.to_upper_camel_case(),
            NameConverter::CamelCase => name.to_lower_camel_case(),
            NameConverter::SnakeCase => name.to_snake_case(),
            NameConverter::LowerCase => name.to_lowercase(),
            NameConverter::Custom(custom) => (custom.func)(name),
        }
    }
}

impl Default for NameConverter {
    fn default() -> Self {
        NameConverter::Identity
    }
}

impl PartialEq for NameConverter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NameConverter::Identity, NameConverter::Identity)
            | (NameConverter::PascalCase, NameConverter::PascalCase)
            | (NameConverter::CamelCase, NameConverter::CamelCase)
            | (NameConverter::SnakeCase, NameConverter::SnakeCase)
            | (NameConverter::LowerCase, NameConverter::LowerCase) => true,
            (NameConverter::Custom(a), NameConverter::Custom(b)) => {
                a.name == b.name && Arc::ptr_eq(&a.func, &b.func)
            }
            _ => false,
        }
    }
}

impl Display for NameConverter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NameConverter::Identity => write!(f, "identity"),
            NameConverter::PascalCase => write!(f, "pascal_case"),
            NameConverter::CamelCase => write!(f, "camel_case"),
            NameConverter::SnakeCase => write!(f, "snake_case"),
            NameConverter::LowerCase => write!(f, "lower_case"),
            NameConverter::Custom(custom) => write!(f, "{}", custom.name),
        }
    }
}

impl Debug for NameConverter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NameConverter({})", self)
    }
}

#[derive(Clone)]
pub struct CustomNameConverter {
    pub name: String,
    func: Arc<dyn Fn(&str) -> String + Send + Sync>,
}
