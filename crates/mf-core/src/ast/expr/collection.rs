use crate::ast::{Expr, Ty};
use crate::names::NameConverter;
use std::fmt::{Display, Formatter};

common_struct! {
    pub struct ExprMapEntry {
        pub key: Expr,
        pub value: Expr,
    }
}

impl ExprMapEntry {
    pub fn new(key: Expr, value: Expr) -> Self {
        Self { key, value }
    }
}

common_struct! {
    /// `Ty { key: value, .. }`: a new container populated through `Add`
    pub struct ExprMapInit {
        pub ty: Ty,
        pub entries: Vec<ExprMapEntry>,
    }
}

impl ExprMapInit {
    pub fn new(ty: Ty) -> Self {
        Self {
            ty,
            entries: Vec::new(),
        }
    }
    pub fn push(&mut self, key: Expr, value: Expr) {
        self.entries.push(ExprMapEntry::new(key, value));
    }
}

common_enum! {
    /// Keyed container primitives available to generated programs. The
    /// flexible variants carry the destination-side name converter.
    pub enum IntrinsicCallKind {
        /// `(map, key)`: the value under `key`, or null
        GetValueOrDefault,
        /// `(map, key)`: the value under the first key whose converted form equals `key`
        FlexibleGet(NameConverter),
        /// `(map, key, value)`: writes under the first key whose converted
        /// form equals `key`, or under `key` itself
        FlexibleSet(NameConverter),
    }
}

impl IntrinsicCallKind {
    pub fn arity(&self) -> usize {
        match self {
            IntrinsicCallKind::GetValueOrDefault | IntrinsicCallKind::FlexibleGet(_) => 2,
            IntrinsicCallKind::FlexibleSet(_) => 3,
        }
    }
    pub fn is_flexible(&self) -> bool {
        !matches!(self, IntrinsicCallKind::GetValueOrDefault)
    }
}

impl Display for IntrinsicCallKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IntrinsicCallKind::GetValueOrDefault => write!(f, "get_value_or_default"),
            IntrinsicCallKind::FlexibleGet(_) => write!(f, "flexible_get"),
            IntrinsicCallKind::FlexibleSet(_) => write!(f, "flexible_set"),
        }
    }
}

common_struct! {
    pub struct ExprIntrinsicCall {
        pub kind: IntrinsicCallKind,
        pub args: Vec<Expr>,
    }
}

impl ExprIntrinsicCall {
    pub fn new(kind: IntrinsicCallKind, args: Vec<Expr>) -> Self {
        Self { kind, args }
    }
}
