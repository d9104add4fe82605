use mf_core::ast::Expr;
use mf_core::names::NameConverter;
use mf_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// What a generated program is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    /// build a brand-new destination
    NewInstance,
    /// write into an existing, possibly populated, destination
    MergeIntoExisting,
    /// a pure single expression for an external query translator
    Projection,
}

impl Display for MapKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MapKind::NewInstance => write!(f, "new-instance"),
            MapKind::MergeIntoExisting => write!(f, "merge"),
            MapKind::Projection => write!(f, "projection"),
        }
    }
}

/// How member names and dictionary keys are matched.
///
/// `source` turns a source member name into the key that is written;
/// `destination` is applied to keys already present in a destination when
/// looking them up during a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatchingStrategy {
    pub source: NameConverter,
    pub destination: NameConverter,
}

impl NameMatchingStrategy {
    pub fn exact() -> Self {
        Self {
            source: NameConverter::Identity,
            destination: NameConverter::Identity,
        }
    }

    pub fn flexible() -> Self {
        Self {
            source: NameConverter::PascalCase,
            destination: NameConverter::PascalCase,
        }
    }

    pub fn ignore_case() -> Self {
        Self {
            source: NameConverter::LowerCase,
            destination: NameConverter::LowerCase,
        }
    }

    /// Keys are written in camelCase; existing keys are matched as-is
    pub fn to_camel_case() -> Self {
        Self {
            source: NameConverter::CamelCase,
            destination: NameConverter::Identity,
        }
    }

    /// Keys are written as member names; existing camelCase keys are matched
    /// after converting them to PascalCase
    pub fn from_camel_case() -> Self {
        Self {
            source: NameConverter::Identity,
            destination: NameConverter::PascalCase,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.source.is_identity() && self.destination.is_identity()
    }
}

impl Default for NameMatchingStrategy {
    fn default() -> Self {
        Self::exact()
    }
}

/// Upper bound on nested conversions when none is configured
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Settings snapshot consulted while generating a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeAdapterSettings {
    /// Skip writing members whose value is null
    pub ignore_null_values: bool,
    pub name_matching: NameMatchingStrategy,
    /// Base construction for the outermost new destination; a map
    /// initializer keeps its entries ahead of the mapped ones. Nested
    /// dictionaries always start empty.
    #[serde(skip)]
    pub construct_using: Option<Expr>,
    pub max_depth: Option<usize>,
}

impl TypeAdapterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn ignore_null_values(mut self, ignore: bool) -> Self {
        self.ignore_null_values = ignore;
        self
    }

    pub fn name_matching(mut self, strategy: NameMatchingStrategy) -> Self {
        self.name_matching = strategy;
        self
    }

    pub fn construct_using(mut self, expr: Expr) -> Self {
        self.construct_using = Some(expr);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }
}

impl Default for TypeAdapterSettings {
    fn default() -> Self {
        Self {
            ignore_null_values: false,
            name_matching: NameMatchingStrategy::exact(),
            construct_using: None,
            max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_json() -> Result<()> {
        let settings = TypeAdapterSettings::from_json(
            r#"{"ignore_null_values": true, "name_matching": {"source": "CamelCase", "destination": "Identity"}}"#,
        )?;
        assert!(settings.ignore_null_values);
        assert_eq!(settings.name_matching, NameMatchingStrategy::to_camel_case());
        assert_eq!(settings.max_depth(), DEFAULT_MAX_DEPTH);

        let defaults = TypeAdapterSettings::from_json("{}")?;
        assert_eq!(defaults, TypeAdapterSettings::default());
        Ok(())
    }
}
