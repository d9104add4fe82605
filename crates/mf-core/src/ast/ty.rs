use crate::id::Ident;
use derive_more::From;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

pub type BType = Box<Ty>;
pub type TySlot = Option<Ty>;

common_enum! {
    /// Static shape of a value as seen by the mapping generators.
    #[derive(From)]
    pub enum Ty {
        Primitive(TypePrimitive),
        Struct(TypeStruct),
        Map(TypeMap),
        List(TypeList),
        Option(TypeOption),
        /// fully dynamic: no member shape is known
        Any(TypeAny),
    }
}

impl Ty {
    pub const fn any() -> Ty {
        Ty::Any(TypeAny)
    }
    pub const fn int() -> Ty {
        Ty::Primitive(TypePrimitive::Int)
    }
    pub const fn decimal() -> Ty {
        Ty::Primitive(TypePrimitive::Decimal)
    }
    pub const fn bool() -> Ty {
        Ty::Primitive(TypePrimitive::Bool)
    }
    pub const fn char() -> Ty {
        Ty::Primitive(TypePrimitive::Char)
    }
    pub const fn string() -> Ty {
        Ty::Primitive(TypePrimitive::String)
    }
    pub fn map(key: Ty, value: Ty) -> Ty {
        Ty::Map(TypeMap::new(key, value))
    }
    /// The common `Map<String, V>` destination
    pub fn string_map(value: Ty) -> Ty {
        Ty::map(Ty::string(), value)
    }
    pub fn list(elem: Ty) -> Ty {
        Ty::List(TypeList {
            elem: Box::new(elem),
        })
    }
    pub fn option(inner: Ty) -> Ty {
        Ty::Option(TypeOption {
            inner: Box::new(inner),
        })
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Ty::Any(_))
    }
    pub fn is_string(&self) -> bool {
        matches!(self, Ty::Primitive(TypePrimitive::String))
    }

    /// Whether a value of this type may be null: reference types and
    /// nullable value types. Value-type primitives and value structs cannot.
    pub fn is_nullable(&self) -> bool {
        match self {
            Ty::Primitive(prim) => prim.is_reference(),
            Ty::Struct(s) => s.kind == StructKind::Class,
            Ty::Map(_) | Ty::List(_) | Ty::Option(_) | Ty::Any(_) => true,
        }
    }

    pub fn as_struct(&self) -> Option<&TypeStruct> {
        match self {
            Ty::Struct(s) => Some(s),
            _ => None,
        }
    }
    /// Strips one level of `Option`
    pub fn unwrap_option(&self) -> &Ty {
        match self {
            Ty::Option(opt) => &opt.inner,
            _ => self,
        }
    }
}

impl Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Primitive(prim) => write!(f, "{}", prim),
            Ty::Struct(s) => write!(f, "{}", s.name),
            Ty::Map(m) => write!(f, "{}", m),
            Ty::List(l) => write!(f, "Vec<{}>", l.elem),
            Ty::Option(o) => write!(f, "Option<{}>", o.inner),
            Ty::Any(_) => write!(f, "Any"),
        }
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum TypePrimitive {
        Int,
        Decimal,
        Bool,
        Char,
        String,
    }
}

impl TypePrimitive {
    /// Strings are the only primitive with reference semantics
    pub fn is_reference(&self) -> bool {
        matches!(self, TypePrimitive::String)
    }
}

impl Display for TypePrimitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypePrimitive::Int => write!(f, "i64"),
            TypePrimitive::Decimal => write!(f, "f64"),
            TypePrimitive::Bool => write!(f, "bool"),
            TypePrimitive::Char => write!(f, "char"),
            TypePrimitive::String => write!(f, "String"),
        }
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum StructKind {
        /// reference semantics, nullable
        Class,
        /// value semantics, never null
        Value,
    }
}

common_enum! {
    #[derive(Copy, Eq, Hash)]
    pub enum MemberAccess {
        ReadWrite,
        ReadOnly,
        WriteOnly,
    }
}

common_struct! {
    pub struct StructField {
        pub name: Ident,
        pub ty: Ty,
        pub access: MemberAccess,
    }
}

impl StructField {
    pub fn new(name: impl Into<Ident>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            access: MemberAccess::ReadWrite,
        }
    }
    pub fn with_access(mut self, access: MemberAccess) -> Self {
        self.access = access;
        self
    }
    pub fn is_readable(&self) -> bool {
        self.access != MemberAccess::WriteOnly
    }
}

common_struct! {
    pub struct TypeStruct {
        pub name: Ident,
        pub kind: StructKind,
        pub fields: Vec<StructField>,
        /// the associative shape this named type implements, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub map_shape: Option<TypeMap>,
    }
}

impl TypeStruct {
    pub fn class(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            kind: StructKind::Class,
            fields: Vec::new(),
            map_shape: None,
        }
    }
    pub fn value(name: impl Into<Ident>) -> Self {
        Self {
            kind: StructKind::Value,
            ..Self::class(name)
        }
    }
    pub fn with_field(mut self, name: impl Into<Ident>, ty: Ty) -> Self {
        self.fields.push(StructField::new(name, ty));
        self
    }
    pub fn with_member(mut self, field: StructField) -> Self {
        self.fields.push(field);
        self
    }
    pub fn implementing(mut self, shape: TypeMap) -> Self {
        self.map_shape = Some(shape);
        self
    }
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|field| field.name.as_str() == name)
    }
}

common_struct! {
    pub struct TypeMap {
        pub key: BType,
        pub value: BType,
        /// read-only maps support lookups but neither indexer writes nor `Add`
        #[serde(default)]
        pub read_only: bool,
    }
}

impl TypeMap {
    pub fn new(key: Ty, value: Ty) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
            read_only: false,
        }
    }
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

impl Display for TypeMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = if self.read_only { "ReadOnlyMap" } else { "Map" };
        write!(
            f,
            "{}<{}>",
            name,
            [self.key.as_ref(), self.value.as_ref()].iter().join(", ")
        )
    }
}

common_struct! {
    pub struct TypeList {
        pub elem: BType,
    }
}

common_struct! {
    pub struct TypeOption {
        pub inner: BType,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TypeAny;
