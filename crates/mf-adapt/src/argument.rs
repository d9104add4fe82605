use std::sync::Arc;

use mf_core::ast::Ty;

use crate::settings::{MapKind, TypeAdapterSettings};

/// One transformation request: what is mapped to what, how, and with which
/// settings. Immutable once built; nested conversions derive a child request.
#[derive(Debug, Clone)]
pub struct CompileArgument {
    pub source_ty: Ty,
    pub destination_ty: Ty,
    pub kind: MapKind,
    pub settings: Arc<TypeAdapterSettings>,
    /// nesting level of the conversion this request belongs to
    pub depth: usize,
}

impl CompileArgument {
    pub fn new(
        source_ty: Ty,
        destination_ty: Ty,
        kind: MapKind,
        settings: Arc<TypeAdapterSettings>,
    ) -> Self {
        Self {
            source_ty,
            destination_ty,
            kind,
            settings,
            depth: 0,
        }
    }

    /// A request for a conversion nested inside this one
    pub fn nested(&self, source_ty: Ty, destination_ty: Ty, kind: MapKind) -> Self {
        Self {
            source_ty,
            destination_ty,
            kind,
            settings: self.settings.clone(),
            depth: self.depth + 1,
        }
    }

    /// Whether this is the outermost request rather than a nested conversion
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn is_merge(&self) -> bool {
        self.kind == MapKind::MergeIntoExisting
    }

    pub fn is_projection(&self) -> bool {
        self.kind == MapKind::Projection
    }

    pub fn ignore_null_values(&self) -> bool {
        self.settings.ignore_null_values
    }
}
