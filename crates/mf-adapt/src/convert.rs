//! Recursive conversion of member values to a destination value type.
//!
//! Conversions between primitives, maps and lists are left to runtime
//! coercion. A struct converted to a dictionary-shaped type gets a nested
//! program generated by the dictionary adapter; when merging, that program
//! receives the prior destination value and updates it in place.

use mf_core::ast::{Expr, ExprClosure, ExprConvert, Ty};
use mf_core::id::Ident;
use mf_core::{config_bail, config_ensure, trace, Result};

use crate::adapter::TypeAdapter;
use crate::argument::CompileArgument;
use crate::dictionary::DictionaryAdapter;
use crate::settings::MapKind;
use crate::shape::DictionaryShape;

/// Converts a value expression to a target type
pub trait ValueConverter: Send + Sync {
    /// Convert `source` to `target`, with no prior value
    fn adapt(
        &self,
        source: Expr,
        source_ty: &Ty,
        target: &Ty,
        arg: &CompileArgument,
    ) -> Result<Expr>;

    /// Convert `source` to `target`, merging into the prior value `existing`
    fn adapt_to(
        &self,
        source: Expr,
        source_ty: &Ty,
        existing: Expr,
        target: &Ty,
        arg: &CompileArgument,
    ) -> Result<Expr>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueConverter;

impl DefaultValueConverter {
    fn check_depth(arg: &CompileArgument, source_ty: &Ty, target: &Ty) -> Result<()> {
        config_ensure!(
            arg.depth < arg.settings.max_depth(),
            "mapping depth {} exceeded while converting {} to {}",
            arg.settings.max_depth(),
            source_ty,
            target
        );
        Ok(())
    }

    /// A nested mapping applies when a struct is converted to a map shape
    fn nested_mapping(source_ty: &Ty, target: &Ty) -> bool {
        source_ty.unwrap_option().as_struct().is_some()
            && DictionaryShape::of(target).is_some_and(|shape| shape.has_textual_key())
    }

    fn nested_program(
        &self,
        source: Expr,
        source_ty: &Ty,
        existing: Option<Expr>,
        target: &Ty,
        arg: &CompileArgument,
    ) -> Result<Expr> {
        let kind = match (&existing, arg.kind) {
            (Some(_), _) => MapKind::MergeIntoExisting,
            (None, MapKind::Projection) => MapKind::Projection,
            (None, _) => MapKind::NewInstance,
        };
        let inner_source_ty = source_ty.unwrap_option().clone();
        let nested = arg.nested(inner_source_ty.clone(), target.clone(), kind);
        let adapter = DictionaryAdapter::default();
        config_ensure!(
            adapter.can_map(&inner_source_ty, target, kind),
            "no conversion from {} to {}",
            source_ty,
            target
        );

        let src = Ident::new(format!("src{}", nested.depth));
        let src_expr = Expr::ident(src.clone()).with_ty(inner_source_ty);
        let convert = match existing {
            Some(existing) => {
                let dest = Ident::new(format!("dest{}", nested.depth));
                let dest_expr = Expr::ident(dest.clone()).with_ty(target.clone());
                let body = adapter.create_block_expression(&src_expr, &dest_expr, &nested)?;
                ExprConvert::new(source, target.clone())
                    .with_existing(existing)
                    .with_via(ExprClosure::new(vec![src, dest], body))
            }
            None => {
                let body = adapter.create_expression(&src_expr, None, &nested)?;
                ExprConvert::new(source, target.clone())
                    .with_via(ExprClosure::new(vec![src], body))
            }
        };
        trace!(depth = nested.depth, %kind, "nested mapping {} -> {}", source_ty, target);
        Ok(Expr::from(convert).with_ty(target.clone()))
    }
}

/// Whether runtime coercion alone can turn a `from` value into a `to` value
fn is_direct(from: &Ty, to: &Ty) -> bool {
    match (from, to) {
        (_, Ty::Any(_)) | (Ty::Any(_), _) => true,
        (a, b) if a == b => true,
        (Ty::Option(a), b) => is_direct(&a.inner, b),
        (a, Ty::Option(b)) => is_direct(a, &b.inner),
        (Ty::Primitive(_), Ty::Primitive(_)) => true,
        (Ty::Map(a), Ty::Map(b)) => {
            a.key.is_string() && b.key.is_string() && is_direct(&a.value, &b.value)
        }
        (Ty::List(a), Ty::List(b)) => is_direct(&a.elem, &b.elem),
        _ => false,
    }
}

impl ValueConverter for DefaultValueConverter {
    fn adapt(
        &self,
        source: Expr,
        source_ty: &Ty,
        target: &Ty,
        arg: &CompileArgument,
    ) -> Result<Expr> {
        Self::check_depth(arg, source_ty, target)?;
        if is_direct(source_ty, target) {
            return Ok(Expr::from(ExprConvert::new(source, target.clone())).with_ty(target.clone()));
        }
        if Self::nested_mapping(source_ty, target) {
            return self.nested_program(source, source_ty, None, target, arg);
        }
        config_bail!("no conversion from {} to {}", source_ty, target)
    }

    fn adapt_to(
        &self,
        source: Expr,
        source_ty: &Ty,
        existing: Expr,
        target: &Ty,
        arg: &CompileArgument,
    ) -> Result<Expr> {
        Self::check_depth(arg, source_ty, target)?;
        if Self::nested_mapping(source_ty, target) {
            return self.nested_program(source, source_ty, Some(existing), target, arg);
        }
        // only nested mappings can merge; anything else replaces the prior value
        self.adapt(source, source_ty, target, arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TypeAdapterSettings;
    use mf_core::ast::{ExprKind, TypeStruct};
    use std::sync::Arc;

    fn arg(kind: MapKind) -> CompileArgument {
        CompileArgument::new(Ty::any(), Ty::string_map(Ty::any()), kind, Arc::new(TypeAdapterSettings::default()))
    }

    #[test]
    fn primitives_convert_directly() -> Result<()> {
        let expr = DefaultValueConverter.adapt(
            Expr::ident("x"),
            &Ty::int(),
            &Ty::string(),
            &arg(MapKind::NewInstance),
        )?;
        assert!(matches!(&expr.kind, ExprKind::Convert(c) if c.via.is_none() && c.ty == Ty::string()));
        Ok(())
    }

    #[test]
    fn unrelated_structs_have_no_conversion() {
        let a: Ty = TypeStruct::class("A").into();
        let b: Ty = TypeStruct::class("B").into();
        let err = DefaultValueConverter
            .adapt(Expr::ident("x"), &a, &b, &arg(MapKind::NewInstance))
            .err();
        assert!(err.is_some_and(|err| err.is_configuration()));
    }

    #[test]
    fn depth_is_bounded() {
        let mut request = arg(MapKind::NewInstance);
        request.depth = request.settings.max_depth();
        let err = DefaultValueConverter
            .adapt(Expr::ident("x"), &Ty::int(), &Ty::int(), &request)
            .err();
        assert!(err.is_some_and(|err| err.is_configuration()));
    }
}
