use crate::ast::{BValue, Ty, TySlot, Value};
use crate::id::Ident;
use derive_more::From;
use std::fmt::{Display, Formatter};

mod collection;
mod stmt;

pub use collection::*;
pub use stmt::*;

pub type BExpr = Box<Expr>;

common_enum! {
    /// A node of a generated mapping program
    #[derive(From)]
    pub enum ExprKind {
        Value(BValue),
        /// a parameter or a local bound by `let`
        Locator(Ident),
        /// read one member off a source instance
        Select(ExprSelect),
        /// recursive value conversion to a target type
        Convert(ExprConvert),
        /// run `then` only when `value` is not null
        Guard(ExprGuard),
        /// `target[key] = value`
        IndexAssign(ExprIndexAssign),
        IntrinsicCall(ExprIntrinsicCall),
        /// construction of a new map with initializer entries
        MapInit(ExprMapInit),
        Block(ExprBlock),
        Closure(ExprClosure),
    }
}

common_struct! {
    pub struct Expr {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
        #[serde(flatten)]
        pub kind: ExprKind,
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn with_ty(mut self, ty: Ty) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn ty(&self) -> Option<&Ty> {
        self.ty.as_ref()
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn into_parts(self) -> (TySlot, ExprKind) {
        (self.ty, self.kind)
    }

    pub fn value(v: Value) -> Expr {
        ExprKind::Value(Box::new(v)).into()
    }
    pub fn string(s: impl Into<String>) -> Expr {
        Expr::value(Value::string(s)).with_ty(Ty::string())
    }
    pub fn ident(name: impl Into<Ident>) -> Expr {
        ExprKind::Locator(name.into()).into()
    }
    pub fn block(block: ExprBlock) -> Expr {
        ExprKind::Block(block).into()
    }

    pub fn as_locator(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Locator(ident) => Some(ident),
            _ => None,
        }
    }

    /// Visits this node and every node below it, in evaluation order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match &self.kind {
            ExprKind::Value(_) | ExprKind::Locator(_) => {}
            ExprKind::Select(select) => select.obj.walk(visit),
            ExprKind::Convert(convert) => {
                convert.value.walk(visit);
                if let Some(existing) = &convert.existing {
                    existing.walk(visit);
                }
                if let Some(via) = &convert.via {
                    via.body.walk(visit);
                }
            }
            ExprKind::Guard(guard) => {
                guard.value.walk(visit);
                guard.then.walk(visit);
            }
            ExprKind::IndexAssign(assign) => {
                assign.target.walk(visit);
                assign.key.walk(visit);
                assign.value.walk(visit);
            }
            ExprKind::IntrinsicCall(call) => {
                for arg in &call.args {
                    arg.walk(visit);
                }
            }
            ExprKind::MapInit(init) => {
                for entry in &init.entries {
                    entry.key.walk(visit);
                    entry.value.walk(visit);
                }
            }
            ExprKind::Block(block) => {
                for stmt in &block.stmts {
                    match stmt {
                        BlockStmt::Let(stmt) => stmt.init.walk(visit),
                        BlockStmt::Expr(expr) => expr.walk(visit),
                    }
                }
                if let Some(expr) = &block.expr {
                    expr.walk(visit);
                }
            }
            ExprKind::Closure(closure) => closure.body.walk(visit),
        }
    }

    /// Whether any node below satisfies `pred`
    pub fn any(&self, mut pred: impl FnMut(&Expr) -> bool) -> bool {
        let mut found = false;
        self.walk(&mut |expr| found = found || pred(expr));
        found
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        crate::ast::pretty::write_expr_source(self, f)
    }
}

impl<T> From<T> for Expr
where
    ExprKind: From<T>,
{
    fn from(value: T) -> Self {
        Expr::new(ExprKind::from(value))
    }
}

common_struct! {
    pub struct ExprSelect {
        pub obj: BExpr,
        pub field: Ident,
        /// declared position of the member, resolved at generation time
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub index: Option<usize>,
    }
}

impl ExprSelect {
    pub fn new(obj: Expr, field: impl Into<Ident>, index: Option<usize>) -> Self {
        Self {
            obj: Box::new(obj),
            field: field.into(),
            index,
        }
    }
}

common_struct! {
    pub struct ExprConvert {
        pub value: BExpr,
        pub ty: Ty,
        /// prior destination value, present for merge conversions
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub existing: Option<BExpr>,
        /// nested program that performs the conversion; takes the value
        /// (and the prior destination value when merging)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub via: Option<ExprClosure>,
    }
}

impl ExprConvert {
    pub fn new(value: Expr, ty: Ty) -> Self {
        Self {
            value: Box::new(value),
            ty,
            existing: None,
            via: None,
        }
    }
    pub fn with_existing(mut self, existing: Expr) -> Self {
        self.existing = Some(Box::new(existing));
        self
    }
    pub fn with_via(mut self, via: ExprClosure) -> Self {
        self.via = Some(via);
        self
    }
}

common_struct! {
    pub struct ExprGuard {
        pub value: BExpr,
        pub then: BExpr,
    }
}

impl ExprGuard {
    pub fn non_null(value: Expr, then: Expr) -> Self {
        Self {
            value: Box::new(value),
            then: Box::new(then),
        }
    }
}

common_struct! {
    pub struct ExprIndexAssign {
        pub target: BExpr,
        pub key: BExpr,
        pub value: BExpr,
    }
}

impl ExprIndexAssign {
    pub fn new(target: Expr, key: Expr, value: Expr) -> Self {
        Self {
            target: Box::new(target),
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

common_struct! {
    pub struct ExprClosure {
        pub params: Vec<Ident>,
        pub body: BExpr,
    }
}

impl ExprClosure {
    pub fn new(params: Vec<Ident>, body: Expr) -> Self {
        Self {
            params,
            body: Box::new(body),
        }
    }
}
