use mf_core::ast::{Expr, Ty};
use mf_core::Result;

use crate::argument::CompileArgument;
use crate::settings::MapKind;

/// A generator of mapping programs for a family of type pairs.
///
/// `create_expression` is the shared flow: a single expression when the
/// adapter allows it, otherwise a block over the given destination or a
/// freshly instantiated one.
pub trait TypeAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Priority among adapters that can map the same pair; higher wins
    fn score(&self) -> i32;

    fn can_map(&self, source: &Ty, destination: &Ty, kind: MapKind) -> bool;

    fn can_inline(&self, _source: &Expr, destination: Option<&Expr>, arg: &CompileArgument) -> bool {
        can_inline_base(destination, arg)
    }

    fn create_block_expression(
        &self,
        source: &Expr,
        destination: &Expr,
        arg: &CompileArgument,
    ) -> Result<Expr>;

    fn create_inline_expression(&self, source: &Expr, arg: &CompileArgument) -> Result<Expr>;

    /// A new, empty destination
    fn create_instantiation_expression(&self, arg: &CompileArgument) -> Result<Expr>;

    fn create_expression(
        &self,
        source: &Expr,
        destination: Option<&Expr>,
        arg: &CompileArgument,
    ) -> Result<Expr> {
        if self.can_inline(source, destination, arg) {
            return self.create_inline_expression(source, arg);
        }
        match destination {
            Some(destination) => self.create_block_expression(source, destination, arg),
            None => {
                let destination = self.create_instantiation_expression(arg)?;
                self.create_block_expression(source, &destination, arg)
            }
        }
    }
}

/// The eligibility rule every adapter starts from: an inline program builds a
/// new container, so it can never serve a merge
pub fn can_inline_base(_destination: Option<&Expr>, arg: &CompileArgument) -> bool {
    arg.kind != MapKind::MergeIntoExisting
}
