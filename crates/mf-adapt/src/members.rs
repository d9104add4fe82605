//! Member enumeration for source types.

use mf_core::ast::{Expr, ExprSelect, Ty};
use mf_core::id::Ident;

/// A readable member of a source type
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: Ident,
    pub ty: Ty,
    /// declared position among the type's members
    pub index: usize,
}

impl MemberDescriptor {
    /// An expression reading this member off `source`
    pub fn read(&self, source: &Expr) -> Expr {
        Expr::from(ExprSelect::new(source.clone(), self.name.clone(), Some(self.index)))
            .with_ty(self.ty.clone())
    }

    pub fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }
}

/// The readable fields and properties of `ty` in declared order. Only struct
/// types (optionally wrapped in `Option`) have members; write-only members
/// are skipped.
pub fn fields_and_properties(ty: &Ty) -> Vec<MemberDescriptor> {
    let Some(ty) = ty.unwrap_option().as_struct() else {
        return Vec::new();
    };
    ty.fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.is_readable())
        .map(|(index, field)| MemberDescriptor {
            name: field.name.clone(),
            ty: field.ty.clone(),
            index,
        })
        .collect()
}
