//! Mapping of objects into string-keyed dictionaries.
//!
//! A block program binds the destination once and writes one entry per
//! source member:
//!
//! ```text
//! {
//!     let mut dict = dest;
//!     dict["Age"] = convert::<Any>(src.Age);
//!     if src.Email != null {
//!         dict["Email"] = convert::<Any>(src.Email);
//!     }
//!     dict
//! }
//! ```
//!
//! An inline program is a single initializer:
//!
//! ```text
//! Map<String, Any> {
//!     "Age": convert::<Any>(src.Age),
//!     "Email": convert::<Any>(src.Email),
//! }
//! ```

use std::sync::Arc;

use mf_core::ast::{
    Expr, ExprBlock, ExprGuard, ExprIndexAssign, ExprIntrinsicCall, ExprKind, ExprMapInit,
    IntrinsicCallKind, StmtLet, Ty,
};
use mf_core::{config_bail, debug, trace, Result};

use crate::adapter::{can_inline_base, TypeAdapter};
use crate::argument::CompileArgument;
use crate::convert::{DefaultValueConverter, ValueConverter};
use crate::members::fields_and_properties;
use crate::settings::MapKind;
use crate::shape::DictionaryShape;

const DICT_LOCAL: &str = "dict";

pub struct DictionaryAdapter {
    converter: Arc<dyn ValueConverter>,
}

impl DictionaryAdapter {
    pub const SCORE: i32 = -149;

    pub fn new(converter: Arc<dyn ValueConverter>) -> Self {
        Self { converter }
    }

    /// The destination's shape, which generated code writes into
    fn writable_shape(arg: &CompileArgument) -> Result<DictionaryShape> {
        let Some(shape) = DictionaryShape::of(&arg.destination_ty) else {
            config_bail!("{} is not a dictionary type", arg.destination_ty)
        };
        if !shape.writable {
            config_bail!("cannot write into read-only dictionary type {}", arg.destination_ty);
        }
        Ok(shape)
    }
}

impl Default for DictionaryAdapter {
    fn default() -> Self {
        Self::new(Arc::new(DefaultValueConverter))
    }
}

impl TypeAdapter for DictionaryAdapter {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn score(&self) -> i32 {
        Self::SCORE
    }

    fn can_map(&self, source: &Ty, destination: &Ty, _kind: MapKind) -> bool {
        let source = source.unwrap_option();
        if source.is_string() || source.is_any() {
            return false;
        }
        DictionaryShape::of(destination).is_some_and(|shape| shape.has_textual_key())
    }

    fn can_inline(&self, _source: &Expr, destination: Option<&Expr>, arg: &CompileArgument) -> bool {
        if !can_inline_base(destination, arg) {
            return false;
        }
        if arg.is_projection() {
            return true;
        }
        !arg.ignore_null_values()
    }

    fn create_block_expression(
        &self,
        source: &Expr,
        destination: &Expr,
        arg: &CompileArgument,
    ) -> Result<Expr> {
        let shape = Self::writable_shape(arg)?;
        let strategy = &arg.settings.name_matching;
        let merge = arg.is_merge();
        let flexible = merge && !strategy.destination.is_identity();

        let dict = Expr::ident(DICT_LOCAL).with_ty(arg.destination_ty.clone());
        let mut block = ExprBlock::new();
        block.push_let(StmtLet::new_mut(DICT_LOCAL, destination.clone()));

        let members = fields_and_properties(&arg.source_ty);
        debug!(
            source = %arg.source_ty,
            destination = %arg.destination_ty,
            kind = %arg.kind,
            members = members.len(),
            flexible,
            "generating dictionary block"
        );

        for member in &members {
            let key = Expr::string(strategy.source.convert(member.name.as_str()));
            let read = member.read(source);

            let value = if merge {
                let existing_kind = if flexible {
                    IntrinsicCallKind::FlexibleGet(strategy.destination.clone())
                } else {
                    IntrinsicCallKind::GetValueOrDefault
                };
                let existing = Expr::from(ExprIntrinsicCall::new(
                    existing_kind,
                    vec![dict.clone(), key.clone()],
                ))
                .with_ty(shape.value.clone());
                self.converter
                    .adapt_to(read.clone(), &member.ty, existing, &shape.value, arg)?
            } else {
                self.converter.adapt(read.clone(), &member.ty, &shape.value, arg)?
            };

            let write: Expr = if flexible {
                ExprIntrinsicCall::new(
                    IntrinsicCallKind::FlexibleSet(strategy.destination.clone()),
                    vec![dict.clone(), key, value],
                )
                .into()
            } else {
                ExprIndexAssign::new(dict.clone(), key, value).into()
            };

            let guarded = arg.ignore_null_values() && member.is_nullable();
            trace!(member = %member.name, guarded, "dictionary entry");
            if guarded {
                block.push_expr(ExprGuard::non_null(read, write));
            } else {
                block.push_expr(write);
            }
        }

        block.set_value(dict);
        Ok(block.into_expr().with_ty(arg.destination_ty.clone()))
    }

    fn create_inline_expression(&self, source: &Expr, arg: &CompileArgument) -> Result<Expr> {
        let shape = Self::writable_shape(arg)?;
        let mut init = match self.create_instantiation_expression(arg)?.into_parts().1 {
            ExprKind::MapInit(init) => init,
            other => config_bail!(
                "inline dictionary mapping needs a map initializer to build on, found `{}`",
                Expr::new(other)
            ),
        };

        let strategy = &arg.settings.name_matching;
        let members = fields_and_properties(&arg.source_ty);
        debug!(
            source = %arg.source_ty,
            destination = %arg.destination_ty,
            kind = %arg.kind,
            members = members.len(),
            base_entries = init.entries.len(),
            "generating dictionary initializer"
        );

        for member in &members {
            let key = Expr::string(strategy.source.convert(member.name.as_str()));
            let value = self
                .converter
                .adapt(member.read(source), &member.ty, &shape.value, arg)?;
            trace!(member = %member.name, "dictionary initializer entry");
            init.push(key, value);
        }

        Ok(Expr::from(init).with_ty(arg.destination_ty.clone()))
    }

    fn create_instantiation_expression(&self, arg: &CompileArgument) -> Result<Expr> {
        // the base population belongs to the outermost destination only
        let base = arg.settings.construct_using.as_ref().filter(|_| arg.is_root());
        if let Some(base) = base {
            return Ok(base.clone());
        }
        Ok(Expr::from(ExprMapInit::new(arg.destination_ty.clone())).with_ty(arg.destination_ty.clone()))
    }
}
