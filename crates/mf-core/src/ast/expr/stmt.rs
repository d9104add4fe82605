use crate::ast::{BExpr, Expr};
use crate::id::Ident;

common_enum! {
    pub enum BlockStmt {
        Let(StmtLet),
        Expr(BExpr),
    }
}

impl BlockStmt {
    pub fn expr(expr: Expr) -> Self {
        BlockStmt::Expr(Box::new(expr))
    }
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            BlockStmt::Expr(expr) => Some(expr.as_ref()),
            BlockStmt::Let(_) => None,
        }
    }
}

common_struct! {
    pub struct StmtLet {
        pub name: Ident,
        pub mutable: bool,
        pub init: Expr,
    }
}

impl StmtLet {
    pub fn new(name: impl Into<Ident>, init: Expr) -> Self {
        Self {
            name: name.into(),
            mutable: false,
            init,
        }
    }
    pub fn new_mut(name: impl Into<Ident>, init: Expr) -> Self {
        Self {
            mutable: true,
            ..Self::new(name, init)
        }
    }
}

pub type StmtChunk = Vec<BlockStmt>;

common_struct! {
    pub struct ExprBlock {
        pub stmts: StmtChunk,
        /// trailing value of the block; none yields null
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expr: Option<BExpr>,
    }
}

impl ExprBlock {
    pub fn new() -> Self {
        Self {
            stmts: Vec::new(),
            expr: None,
        }
    }
    pub fn push_let(&mut self, stmt: StmtLet) {
        self.stmts.push(BlockStmt::Let(stmt));
    }
    pub fn push_expr(&mut self, expr: impl Into<Expr>) {
        self.stmts.push(BlockStmt::expr(expr.into()));
    }
    pub fn set_value(&mut self, expr: Expr) {
        self.expr = Some(Box::new(expr));
    }
    /// The statements after the leading `let` bindings
    pub fn body_stmts(&self) -> &[BlockStmt] {
        let lets = self
            .stmts
            .iter()
            .take_while(|stmt| matches!(stmt, BlockStmt::Let(_)))
            .count();
        &self.stmts[lets..]
    }
    pub fn into_expr(self) -> Expr {
        Expr::block(self)
    }
}

impl Default for ExprBlock {
    fn default() -> Self {
        Self::new()
    }
}
