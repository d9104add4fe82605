//! Keyed container primitives called by compiled programs.
//!
//! Flexible lookups compare `converter(existing_key)` against the requested
//! key, so a key written as `firstName` is found when asking for
//! `FirstName` under a Pascal-case converter.

use mf_core::ast::{Value, ValueMap};
use mf_core::names::NameConverter;

pub fn get_value_or_default(map: &ValueMap, key: &str) -> Value {
    map.get(key).cloned().unwrap_or_else(Value::null)
}

pub fn flexible_get(map: &ValueMap, key: &str, converter: &NameConverter) -> Value {
    map.iter()
        .find(|(existing, _)| converter.convert(existing) == key)
        .map(|(_, value)| value.clone())
        .unwrap_or_else(Value::null)
}

/// Writes under the first matching existing key, or under `key` itself
pub fn flexible_set(map: &mut ValueMap, key: String, converter: &NameConverter, value: Value) {
    let matched = map
        .keys()
        .find(|existing| converter.convert(existing) == key)
        .map(str::to_string);
    map.insert(matched.unwrap_or(key), value);
}
