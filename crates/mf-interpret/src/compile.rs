//! Lowering of program trees into reusable closures.
//!
//! A program is lowered once: locals are resolved to frame slots, member
//! reads keep their declared position and nested conversion programs are
//! lowered eagerly. Invoking the result only executes the closures.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use mf_core::ast::*;
use mf_core::error::Result;
use mf_core::id::Ident;

use crate::coerce::{coerce, default_for};
use crate::error::interpretation_error;
use crate::{interp_bail, interp_ensure, intrinsics, lowering_bail};

type Thunk = Arc<dyn Fn(&mut Frame) -> Result<Value> + Send + Sync>;

fn thunk(f: impl Fn(&mut Frame) -> Result<Value> + Send + Sync + 'static) -> Thunk {
    Arc::new(f)
}

/// Slots of one program invocation: parameters first, then locals
struct Frame {
    slots: Vec<Value>,
}

impl Frame {
    fn new(args: Vec<Value>, size: usize) -> Self {
        let mut slots = args;
        if slots.len() < size {
            slots.resize(size, Value::null());
        }
        Self { slots }
    }

    fn slot(&self, slot: usize) -> &Value {
        &self.slots[slot]
    }

    fn map(&self, slot: usize) -> Result<&ValueMap> {
        match &self.slots[slot] {
            Value::Map(map) => Ok(map),
            other => interp_bail!("expected a map container, found a {} value", other.kind_name()),
        }
    }

    fn map_mut(&mut self, slot: usize) -> Result<&mut ValueMap> {
        match &mut self.slots[slot] {
            Value::Map(map) => Ok(map),
            other => interp_bail!("expected a map container, found a {} value", other.kind_name()),
        }
    }
}

/// A lowered program, cheap to clone and safe to share between threads
#[derive(Clone)]
pub struct CompiledProgram {
    params: Vec<Ident>,
    frame_size: usize,
    body: Thunk,
}

impl CompiledProgram {
    pub fn params(&self) -> &[Ident] {
        &self.params
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        interp_ensure!(
            args.len() == self.params.len(),
            "program expects {} arguments, got {}",
            self.params.len(),
            args.len()
        );
        let mut frame = Frame::new(args, self.frame_size);
        (self.body)(&mut frame)
    }
}

impl Debug for CompiledProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("params", &self.params)
            .field("frame_size", &self.frame_size)
            .finish()
    }
}

pub fn compile_program(expr: &Expr, params: &[Ident]) -> Result<CompiledProgram> {
    let mut lowering = Lowering::new(params);
    let body = lowering.lower(expr)?;
    tracing::trace!(
        params = params.len(),
        frame_size = lowering.frame_size,
        "lowered program"
    );
    Ok(CompiledProgram {
        params: params.to_vec(),
        frame_size: lowering.frame_size,
        body,
    })
}

struct Lowering {
    /// name of each live slot; later entries shadow earlier ones
    scope: Vec<Ident>,
    frame_size: usize,
}

impl Lowering {
    fn new(params: &[Ident]) -> Self {
        Self {
            scope: params.to_vec(),
            frame_size: params.len(),
        }
    }

    fn resolve(&self, ident: &Ident) -> Result<usize> {
        match self.scope.iter().rposition(|name| name == ident) {
            Some(slot) => Ok(slot),
            None => lowering_bail!("unbound local `{}`", ident),
        }
    }

    fn bind(&mut self, ident: &Ident) -> usize {
        self.scope.push(ident.clone());
        self.frame_size = self.frame_size.max(self.scope.len());
        self.scope.len() - 1
    }

    fn container_slot(&self, expr: &Expr) -> Result<usize> {
        match expr.as_locator() {
            Some(ident) => self.resolve(ident),
            None => lowering_bail!("container operand must be a local binding, found `{}`", expr),
        }
    }

    fn lower(&mut self, expr: &Expr) -> Result<Thunk> {
        match &expr.kind {
            ExprKind::Value(value) => {
                let value = value.as_ref().clone();
                Ok(thunk(move |_| Ok(value.clone())))
            }
            ExprKind::Locator(ident) => {
                let slot = self.resolve(ident)?;
                Ok(thunk(move |frame| Ok(frame.slot(slot).clone())))
            }
            ExprKind::Select(select) => self.lower_select(select),
            ExprKind::Convert(convert) => self.lower_convert(convert),
            ExprKind::Guard(guard) => {
                let value = self.lower(&guard.value)?;
                let then = self.lower(&guard.then)?;
                Ok(thunk(move |frame| {
                    if !value(frame)?.is_null() {
                        then(frame)?;
                    }
                    Ok(Value::null())
                }))
            }
            ExprKind::IndexAssign(assign) => {
                let slot = self.container_slot(&assign.target)?;
                let key = self.lower(&assign.key)?;
                let value = self.lower(&assign.value)?;
                Ok(thunk(move |frame| {
                    let key = expect_key(key(frame)?)?;
                    let value = value(frame)?;
                    frame.map_mut(slot)?.insert(key, value);
                    Ok(Value::null())
                }))
            }
            ExprKind::IntrinsicCall(call) => self.lower_intrinsic(call),
            ExprKind::MapInit(init) => self.lower_map_init(init),
            ExprKind::Block(block) => self.lower_block(block),
            ExprKind::Closure(_) => {
                lowering_bail!("closures are only supported as nested conversion programs")
            }
        }
    }

    fn lower_select(&mut self, select: &ExprSelect) -> Result<Thunk> {
        let field = select.field.clone();
        let index = select.index;
        // members of a local are read in place; only the member is cloned
        if let Some(ident) = select.obj.as_locator() {
            let slot = self.resolve(ident)?;
            return Ok(thunk(move |frame| {
                read_member(frame.slot(slot), &field, index).cloned()
            }));
        }
        let obj = self.lower(&select.obj)?;
        Ok(thunk(move |frame| {
            let obj = obj(frame)?;
            read_member(&obj, &field, index).cloned()
        }))
    }

    fn lower_convert(&mut self, convert: &ExprConvert) -> Result<Thunk> {
        let value = self.lower(&convert.value)?;
        let ty = convert.ty.clone();
        let Some(via) = &convert.via else {
            return Ok(thunk(move |frame| coerce(value(frame)?, &ty)));
        };

        let expected = if convert.existing.is_some() { 2 } else { 1 };
        if via.params.len() != expected {
            lowering_bail!(
                "nested conversion program takes {} parameters, expected {}",
                via.params.len(),
                expected
            );
        }
        let program = compile_program(&via.body, &via.params)?;
        let existing = convert
            .existing
            .as_ref()
            .map(|existing| self.lower(existing))
            .transpose()?;
        Ok(thunk(move |frame| {
            let value = value(frame)?;
            if value.is_null() {
                return Ok(default_for(&ty));
            }
            let mut args = vec![value];
            if let Some(existing) = &existing {
                args.push(match existing(frame)? {
                    map @ Value::Map(_) => map,
                    _ => Value::empty_map(),
                });
            }
            program.invoke(args)
        }))
    }

    fn lower_intrinsic(&mut self, call: &ExprIntrinsicCall) -> Result<Thunk> {
        if call.args.len() != call.kind.arity() {
            lowering_bail!(
                "{} takes {} arguments, got {}",
                call.kind,
                call.kind.arity(),
                call.args.len()
            );
        }
        let slot = self.container_slot(&call.args[0])?;
        let key = self.lower(&call.args[1])?;
        match call.kind.clone() {
            IntrinsicCallKind::GetValueOrDefault => Ok(thunk(move |frame| {
                let key = expect_key(key(frame)?)?;
                Ok(intrinsics::get_value_or_default(frame.map(slot)?, &key))
            })),
            IntrinsicCallKind::FlexibleGet(converter) => Ok(thunk(move |frame| {
                let key = expect_key(key(frame)?)?;
                Ok(intrinsics::flexible_get(frame.map(slot)?, &key, &converter))
            })),
            IntrinsicCallKind::FlexibleSet(converter) => {
                let value = self.lower(&call.args[2])?;
                Ok(thunk(move |frame| {
                    let key = expect_key(key(frame)?)?;
                    let value = value(frame)?;
                    intrinsics::flexible_set(frame.map_mut(slot)?, key, &converter, value);
                    Ok(Value::null())
                }))
            }
        }
    }

    fn lower_map_init(&mut self, init: &ExprMapInit) -> Result<Thunk> {
        let entries = init
            .entries
            .iter()
            .map(|entry| Ok((self.lower(&entry.key)?, self.lower(&entry.value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(thunk(move |frame| {
            let mut map = ValueMap::new();
            for (key, value) in &entries {
                let key = expect_key(key(frame)?)?;
                let value = value(frame)?;
                map.try_add(key, value).map_err(|key| {
                    interpretation_error(format!(
                        "an entry with key {:?} has already been added",
                        key
                    ))
                })?;
            }
            Ok(Value::Map(map))
        }))
    }

    fn lower_block(&mut self, block: &ExprBlock) -> Result<Thunk> {
        let mark = self.scope.len();
        let mut steps: Vec<Thunk> = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            match stmt {
                BlockStmt::Let(stmt) => {
                    let init = self.lower(&stmt.init)?;
                    let slot = self.bind(&stmt.name);
                    steps.push(thunk(move |frame| {
                        frame.slots[slot] = init(frame)?;
                        Ok(Value::null())
                    }));
                }
                BlockStmt::Expr(expr) => steps.push(self.lower(expr)?),
            }
        }

        // a trailing local of this block is moved out rather than cloned
        let tail: Option<Thunk> = match block.expr.as_deref() {
            Some(expr) => match expr.as_locator().map(|ident| self.resolve(ident)) {
                Some(Ok(slot)) if slot >= mark => Some(thunk(move |frame| {
                    Ok(std::mem::replace(&mut frame.slots[slot], Value::null()))
                })),
                _ => Some(self.lower(expr)?),
            },
            None => None,
        };
        self.scope.truncate(mark);

        Ok(thunk(move |frame| {
            for step in &steps {
                step(frame)?;
            }
            match &tail {
                Some(tail) => tail(frame),
                None => Ok(Value::null()),
            }
        }))
    }
}

fn expect_key(key: Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(s.value),
        other => interp_bail!("map keys must be strings, found a {} value", other.kind_name()),
    }
}

fn read_member<'a>(obj: &'a Value, field: &Ident, index: Option<usize>) -> Result<&'a Value> {
    let value = match obj {
        Value::Struct(value) => value,
        Value::Null(_) => interp_bail!("cannot read member `{}` of null", field),
        other => interp_bail!(
            "cannot read member `{}` of a {} value",
            field,
            other.kind_name()
        ),
    };
    let member = match index.and_then(|idx| value.fields.get(idx)) {
        Some(member) if &member.name == field => Some(member),
        _ => value.fields.iter().find(|f| &f.name == field),
    };
    match member {
        Some(member) => Ok(&member.value),
        None => interp_bail!("struct `{}` has no member `{}`", value.name, field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_locals_and_tail_move() -> Result<()> {
        let mut block = ExprBlock::new();
        block.push_let(StmtLet::new_mut("dict", Expr::ident("dest")));
        block.push_expr(ExprIndexAssign::new(
            Expr::ident("dict"),
            Expr::string("k"),
            Expr::value(Value::int(1)),
        ));
        block.set_value(Expr::ident("dict"));

        let program = compile_program(&block.into_expr(), &[Ident::new("dest")])?;
        let result = program.invoke(vec![Value::empty_map()])?;
        assert_eq!(result, Value::map(ValueMap::from_pairs([("k", Value::int(1))])));
        // the frame is fresh per call
        let again = program.invoke(vec![Value::empty_map()])?;
        assert_eq!(again, result);
        Ok(())
    }

    #[test]
    fn member_reads_leave_the_source_intact() -> Result<()> {
        let source: Value = ValueStruct::new("Person")
            .with_field("Name", Value::string("Ada"))
            .with_field("Age", Value::int(36))
            .into();
        let mut init = ExprMapInit::new(Ty::string_map(Ty::any()));
        init.push(
            Expr::string("First"),
            ExprSelect::new(Expr::ident("src"), "Name", Some(0)).into(),
        );
        // a stale position falls back to the name
        init.push(
            Expr::string("Again"),
            ExprSelect::new(Expr::ident("src"), "Name", Some(1)).into(),
        );
        let mut block = ExprBlock::new();
        block.push_let(StmtLet::new("dict", init.into()));
        block.set_value(Expr::ident("src"));

        let program = compile_program(&block.into_expr(), &[Ident::new("src")])?;
        assert_eq!(program.invoke(vec![source.clone()])?, source);
        Ok(())
    }

    #[test]
    fn unbound_locals_are_rejected_at_lowering() {
        let err = compile_program(&Expr::ident("nope"), &[]).err();
        assert!(err.is_some_and(|err| err.is_configuration()));
    }

    #[test]
    fn arity_is_checked_on_invoke() -> Result<()> {
        let program = compile_program(&Expr::ident("src"), &[Ident::new("src")])?;
        assert!(program.invoke(vec![]).is_err());
        Ok(())
    }
}
