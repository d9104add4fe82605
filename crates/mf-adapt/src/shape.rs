use mf_core::ast::{Ty, TypeMap};

/// The associative shape a destination type exposes
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryShape {
    pub key: Ty,
    pub value: Ty,
    /// indexer writes and `Add` are available
    pub writable: bool,
}

impl DictionaryShape {
    /// Discovers the shape of `ty`: a map type, or a named struct that
    /// implements one
    pub fn of(ty: &Ty) -> Option<Self> {
        let map = match ty.unwrap_option() {
            Ty::Map(map) => map,
            Ty::Struct(s) => s.map_shape.as_ref()?,
            _ => return None,
        };
        Some(Self::from_map(map))
    }

    fn from_map(map: &TypeMap) -> Self {
        Self {
            key: map.key.as_ref().clone(),
            value: map.value.as_ref().clone(),
            writable: !map.read_only,
        }
    }

    pub fn has_textual_key(&self) -> bool {
        self.key.is_string()
    }

    pub fn supports_add(&self) -> bool {
        self.writable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::ast::TypeStruct;

    #[test]
    fn struct_implementing_a_map_has_a_shape() {
        let headers: Ty = TypeStruct::class("Headers")
            .implementing(TypeMap::new(Ty::string(), Ty::string()))
            .into();
        let shape = DictionaryShape::of(&headers);
        assert_eq!(shape.map(|s| s.value), Some(Ty::string()));

        let plain: Ty = TypeStruct::class("Plain").into();
        assert_eq!(DictionaryShape::of(&plain), None);

        let frozen = Ty::Map(TypeMap::new(Ty::string(), Ty::int()).read_only());
        assert!(DictionaryShape::of(&frozen).is_some_and(|s| !s.supports_add()));
    }
}
