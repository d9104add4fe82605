//! Runtime value coercions behind `Convert` nodes that carry no nested program.

use mf_core::ast::{Ty, TypePrimitive, Value, ValueList, ValueMap, ValueMapEntry};
use mf_core::error::Result;

use crate::error::interpretation_error;
use crate::interp_bail;

/// The value a null converts to: null for nullable targets, the zero value
/// for value-type primitives
pub fn default_for(ty: &Ty) -> Value {
    match ty {
        Ty::Primitive(TypePrimitive::Int) => Value::int(0),
        Ty::Primitive(TypePrimitive::Decimal) => Value::decimal(0.0),
        Ty::Primitive(TypePrimitive::Bool) => Value::bool(false),
        Ty::Primitive(TypePrimitive::Char) => Value::char('\0'),
        _ => Value::null(),
    }
}

pub fn coerce(value: Value, ty: &Ty) -> Result<Value> {
    match (ty, value) {
        (_, Value::Null(_)) => Ok(default_for(ty)),
        (Ty::Any(_), value) => Ok(value),
        (Ty::Option(opt), value) => coerce(value, &opt.inner),
        (Ty::Primitive(prim), value) => coerce_primitive(value, *prim),
        (Ty::Map(map_ty), Value::Map(map)) => {
            let entries = map
                .entries
                .into_iter()
                .map(|entry| Ok(ValueMapEntry::new(entry.key, coerce(entry.value, &map_ty.value)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Map(ValueMap { entries }))
        }
        (Ty::List(list_ty), Value::List(list)) => {
            let values = list
                .values
                .into_iter()
                .map(|value| coerce(value, &list_ty.elem))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(ValueList::new(values)))
        }
        (Ty::Struct(struct_ty), Value::Struct(value)) if value.name == struct_ty.name => {
            Ok(Value::Struct(value))
        }
        (ty, value) => interp_bail!("cannot convert a {} value to {}", value.kind_name(), ty),
    }
}

fn coerce_primitive(value: Value, prim: TypePrimitive) -> Result<Value> {
    let converted = match (prim, value) {
        (TypePrimitive::Int, value @ Value::Int(_)) => value,
        (TypePrimitive::Int, Value::Decimal(d)) => Value::int(d.value.round() as i64),
        (TypePrimitive::Int, Value::Bool(b)) => Value::int(i64::from(b.value)),
        (TypePrimitive::Int, Value::Char(c)) => Value::int(i64::from(u32::from(c.value))),
        (TypePrimitive::Int, Value::String(s)) => {
            let parsed = s.value.trim().parse::<i64>().map_err(|err| {
                interpretation_error(format!("cannot parse {:?} as i64: {}", s.value, err))
            })?;
            Value::int(parsed)
        }
        (TypePrimitive::Decimal, value @ Value::Decimal(_)) => value,
        (TypePrimitive::Decimal, Value::Int(i)) => Value::decimal(i.value as f64),
        (TypePrimitive::Decimal, Value::Bool(b)) => Value::decimal(if b.value { 1.0 } else { 0.0 }),
        (TypePrimitive::Decimal, Value::String(s)) => {
            let parsed = s.value.trim().parse::<f64>().map_err(|err| {
                interpretation_error(format!("cannot parse {:?} as f64: {}", s.value, err))
            })?;
            Value::decimal(parsed)
        }
        (TypePrimitive::Bool, value @ Value::Bool(_)) => value,
        (TypePrimitive::Bool, Value::Int(i)) => Value::bool(i.value != 0),
        (TypePrimitive::Bool, Value::Decimal(d)) => Value::bool(d.value != 0.0),
        (TypePrimitive::Bool, Value::String(s)) => match s.value.trim() {
            t if t.eq_ignore_ascii_case("true") => Value::bool(true),
            f if f.eq_ignore_ascii_case("false") => Value::bool(false),
            other => interp_bail!("cannot parse {:?} as bool", other),
        },
        (TypePrimitive::Char, value @ Value::Char(_)) => value,
        (TypePrimitive::Char, Value::String(s)) => {
            let mut chars = s.value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::char(c),
                _ => interp_bail!("cannot convert {:?} to char", s.value),
            }
        }
        (TypePrimitive::Char, Value::Int(i)) => {
            let code = u32::try_from(i.value).ok().and_then(char::from_u32);
            match code {
                Some(c) => Value::char(c),
                None => interp_bail!("{} is not a valid char code", i.value),
            }
        }
        (TypePrimitive::String, value @ Value::String(_)) => value,
        (TypePrimitive::String, Value::Int(i)) => Value::string(i.value.to_string()),
        (TypePrimitive::String, Value::Decimal(d)) => Value::string(d.value.to_string()),
        (TypePrimitive::String, Value::Bool(b)) => Value::string(b.value.to_string()),
        (TypePrimitive::String, Value::Char(c)) => Value::string(c.value.to_string()),
        (prim, value) => interp_bail!("cannot convert a {} value to {}", value.kind_name(), prim),
    };
    Ok(converted)
}
