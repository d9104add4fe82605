//! Source-like rendering of generated programs.
//!
//! The output is deterministic for a given program, which makes it usable
//! both for logs and for asserting on the exact shape of generated code.

use std::fmt::{self, Formatter};

use crate::ast::{BlockStmt, Expr, ExprKind, IntrinsicCallKind};
use crate::pretty::{PrettyCtx, PrettyOptions, PrettyPrintable};

impl PrettyPrintable for Expr {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        fmt_expr(self, f, ctx)
    }
}

pub(crate) fn write_expr_source(expr: &Expr, f: &mut Formatter<'_>) -> fmt::Result {
    let options = PrettyOptions::default();
    let mut ctx = PrettyCtx::new(&options);
    fmt_expr(expr, f, &mut ctx)
}

fn fmt_expr(expr: &Expr, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
    match &expr.kind {
        ExprKind::Value(value) => write!(f, "{}", value),
        ExprKind::Locator(ident) => write!(f, "{}", ident),
        ExprKind::Select(select) => {
            fmt_expr(&select.obj, f, ctx)?;
            write!(f, ".{}", select.field)
        }
        ExprKind::Convert(convert) => {
            write!(f, "convert::<{}>(", convert.ty)?;
            fmt_expr(&convert.value, f, ctx)?;
            if let Some(existing) = &convert.existing {
                write!(f, ", ")?;
                fmt_expr(existing, f, ctx)?;
            }
            if let Some(via) = &convert.via {
                let params: Vec<&str> = via.params.iter().map(|p| p.as_str()).collect();
                write!(f, ", |{}| ", params.join(", "))?;
                fmt_expr(&via.body, f, ctx)?;
            }
            write!(f, ")")
        }
        ExprKind::Guard(guard) => {
            write!(f, "if ")?;
            fmt_expr(&guard.value, f, ctx)?;
            writeln!(f, " != null {{")?;
            ctx.with_indent(|ctx| {
                ctx.write_indent(f)?;
                fmt_expr(&guard.then, f, ctx)?;
                writeln!(f, ";")
            })?;
            ctx.write_indent(f)?;
            write!(f, "}}")
        }
        ExprKind::IndexAssign(assign) => {
            fmt_expr(&assign.target, f, ctx)?;
            write!(f, "[")?;
            fmt_expr(&assign.key, f, ctx)?;
            write!(f, "] = ")?;
            fmt_expr(&assign.value, f, ctx)
        }
        ExprKind::IntrinsicCall(call) => {
            write!(f, "{}(", call.kind)?;
            for (idx, arg) in call.args.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                fmt_expr(arg, f, ctx)?;
                // the key converter follows the key argument
                if idx == 1 {
                    match &call.kind {
                        IntrinsicCallKind::FlexibleGet(converter)
                        | IntrinsicCallKind::FlexibleSet(converter) => {
                            write!(f, ", {}", converter)?
                        }
                        IntrinsicCallKind::GetValueOrDefault => {}
                    }
                }
            }
            write!(f, ")")
        }
        ExprKind::MapInit(init) => {
            if init.entries.is_empty() {
                return write!(f, "{} {{}}", init.ty);
            }
            writeln!(f, "{} {{", init.ty)?;
            ctx.with_indent(|ctx| {
                for entry in &init.entries {
                    ctx.write_indent(f)?;
                    fmt_expr(&entry.key, f, ctx)?;
                    write!(f, ": ")?;
                    fmt_expr(&entry.value, f, ctx)?;
                    writeln!(f, ",")?;
                }
                Ok(())
            })?;
            ctx.write_indent(f)?;
            write!(f, "}}")
        }
        ExprKind::Block(block) => {
            writeln!(f, "{{")?;
            ctx.with_indent(|ctx| {
                for stmt in &block.stmts {
                    ctx.write_indent(f)?;
                    match stmt {
                        BlockStmt::Let(stmt) => {
                            let mutability = if stmt.mutable { "mut " } else { "" };
                            write!(f, "let {}{}", mutability, stmt.name)?;
                            if ctx.options.show_types {
                                if let Some(ty) = stmt.init.ty() {
                                    write!(f, ": {}", ty)?;
                                }
                            }
                            write!(f, " = ")?;
                            fmt_expr(&stmt.init, f, ctx)?;
                            writeln!(f, ";")?;
                        }
                        BlockStmt::Expr(expr) => {
                            fmt_expr(expr, f, ctx)?;
                            if matches!(expr.kind, ExprKind::Guard(_)) {
                                writeln!(f)?;
                            } else {
                                writeln!(f, ";")?;
                            }
                        }
                    }
                }
                if let Some(expr) = &block.expr {
                    ctx.write_indent(f)?;
                    fmt_expr(expr, f, ctx)?;
                    writeln!(f)?;
                }
                Ok(())
            })?;
            ctx.write_indent(f)?;
            write!(f, "}}")
        }
        ExprKind::Closure(closure) => {
            let params: Vec<&str> = closure.params.iter().map(|p| p.as_str()).collect();
            write!(f, "|{}| ", params.join(", "))?;
            fmt_expr(&closure.body, f, ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::names::NameConverter;
    use crate::pretty::{pretty, PrettyOptions};

    fn dict() -> Expr {
        Expr::ident("dict")
    }

    #[test]
    fn renders_block_with_guard() {
        let read = Expr::from(ExprSelect::new(Expr::ident("src"), "Name", Some(0)));
        let write = ExprIndexAssign::new(
            dict(),
            Expr::string("Name"),
            ExprConvert::new(read.clone(), Ty::any()).into(),
        );
        let mut block = ExprBlock::new();
        block.push_let(StmtLet::new_mut("dict", Expr::ident("dest")));
        block.push_expr(ExprGuard::non_null(read, write.into()));
        block.set_value(dict());

        let expected = "{\n    let mut dict = dest;\n    if src.Name != null {\n        dict[\"Name\"] = convert::<Any>(src.Name);\n    }\n    dict\n}";
        assert_eq!(block.into_expr().to_string(), expected);
    }

    #[test]
    fn renders_map_init_and_intrinsics() {
        let mut init = ExprMapInit::new(Ty::string_map(Ty::any()));
        init.push(Expr::string("Id"), Expr::value(Value::int(1)));
        let expr = Expr::from(init);
        assert_eq!(expr.to_string(), "Map<String, Any> {\n    \"Id\": 1,\n}");

        let get = Expr::from(ExprIntrinsicCall::new(
            IntrinsicCallKind::FlexibleGet(NameConverter::CamelCase),
            vec![dict(), Expr::string("Id")],
        ));
        assert_eq!(get.to_string(), "flexible_get(dict, \"Id\", camel_case)");
    }

    #[test]
    fn typed_lets_with_options() {
        let mut block = ExprBlock::new();
        block.push_let(StmtLet::new_mut(
            "dict",
            Expr::ident("dest").with_ty(Ty::string_map(Ty::int())),
        ));
        let expr = block.into_expr();
        let options = PrettyOptions {
            indent_size: 2,
            show_types: true,
        };
        assert_eq!(
            pretty(&expr, options).to_string(),
            "{\n  let mut dict: Map<String, i64> = dest;\n}"
        );
    }
}
