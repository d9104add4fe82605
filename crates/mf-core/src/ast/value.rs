use crate::id::Ident;
use derive_more::From;
use serde_json::json;
use std::fmt::{Display, Formatter};

pub type BValue = Box<Value>;

common_enum! {
    /// A runtime value flowing through a compiled mapping program.
    #[derive(From)]
    pub enum Value {
        Null(ValueNull),
        Bool(ValueBool),
        Int(ValueInt),
        Decimal(ValueDecimal),
        Char(ValueChar),
        String(ValueString),
        List(ValueList),
        Map(ValueMap),
        Struct(ValueStruct),
    }
}

impl Value {
    pub fn null() -> Value {
        Value::Null(ValueNull)
    }
    pub fn bool(b: bool) -> Value {
        Value::Bool(ValueBool::new(b))
    }
    pub fn int(i: i64) -> Value {
        Value::Int(ValueInt::new(i))
    }
    pub fn decimal(d: f64) -> Value {
        Value::Decimal(ValueDecimal::new(d))
    }
    pub fn char(c: char) -> Value {
        Value::Char(ValueChar::new(c))
    }
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(ValueString::new(s))
    }
    pub fn list(values: Vec<Value>) -> Value {
        Value::List(ValueList::new(values))
    }
    pub fn map(map: ValueMap) -> Value {
        Value::Map(map)
    }
    pub fn empty_map() -> Value {
        Value::Map(ValueMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }
    pub fn as_struct(&self) -> Option<&ValueStruct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.value.as_str()),
            _ => None,
        }
    }
    /// Short name of the value's runtime kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null(_) => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Decimal(_) => "decimal",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null(_) => serde_json::Value::Null,
            Value::Bool(b) => json!(b.value),
            Value::Int(i) => json!(i.value),
            Value::Decimal(d) => json!(d.value),
            Value::Char(c) => json!(c.value.to_string()),
            Value::String(s) => json!(s.value),
            Value::List(list) => {
                serde_json::Value::Array(list.values.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let mut object = serde_json::Map::new();
                for entry in &map.entries {
                    object.insert(entry.key.clone(), entry.value.to_json());
                }
                serde_json::Value::Object(object)
            }
            Value::Struct(s) => {
                let mut object = serde_json::Map::new();
                for field in &s.fields {
                    object.insert(field.name.name.clone(), field.value.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null(_) => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b.value),
            Value::Int(i) => write!(f, "{}", i.value),
            Value::Decimal(d) => write!(f, "{}", d.value),
            Value::Char(c) => write!(f, "{:?}", c.value),
            Value::String(s) => write!(f, "{:?}", s.value),
            Value::List(list) => write!(f, "{}", list),
            Value::Map(map) => write!(f, "{}", map),
            Value::Struct(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ValueNull;

macro_rules! plain_value {
    ($name:ident, $ty:ty) => {
        common_struct! {
            pub struct $name {
                pub value: $ty,
            }
        }
        impl $name {
            pub fn new(value: impl Into<$ty>) -> Self {
                Self {
                    value: value.into(),
                }
            }
        }
    };
}

plain_value!(ValueBool, bool);
plain_value!(ValueInt, i64);
plain_value!(ValueDecimal, f64);
plain_value!(ValueChar, char);
plain_value!(ValueString, String);

common_struct! {
    pub struct ValueList {
        pub values: Vec<Value>,
    }
}
impl ValueList {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}
impl Display for ValueList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        let mut first = true;
        for value in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", value)?;
        }
        write!(f, "]")
    }
}

common_struct! {
    pub struct ValueMapEntry {
        pub key: String,
        pub value: Value,
    }
}
impl ValueMapEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

common_struct! {
    /// A textual-keyed map that keeps insertion order
    pub struct ValueMap {
        pub entries: Vec<ValueMapEntry>,
    }
}
impl ValueMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut map = Self::new();
        for (key, value) in pairs.into_iter() {
            map.insert(key, value);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Inserts or replaces; a replaced entry keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.key == key) {
            existing.value = value;
        } else {
            self.entries.push(ValueMapEntry::new(key, value));
        }
    }

    /// Adds a new entry, refusing to overwrite an existing key
    pub fn try_add(&mut self, key: impl Into<String>, value: Value) -> Result<(), String> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(key);
        }
        self.entries.push(ValueMapEntry::new(key, value));
        Ok(())
    }
}

impl Default for ValueMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ValueMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for entry in &self.entries {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{:?}: {}", entry.key, entry.value)?;
        }
        write!(f, "}}")
    }
}

common_struct! {
    pub struct ValueField {
        pub name: Ident,
        pub value: Value,
    }
}

common_struct! {
    /// An instance of a named struct type; fields follow declaration order
    pub struct ValueStruct {
        pub name: Ident,
        pub fields: Vec<ValueField>,
    }
}
impl ValueStruct {
    pub fn new(name: impl Into<Ident>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }
    pub fn with_field(mut self, name: impl Into<Ident>, value: Value) -> Self {
        self.fields.push(ValueField {
            name: name.into(),
            value,
        });
        self
    }
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name.as_str() == name)
            .map(|field| &field.value)
    }
}
impl Display for ValueStruct {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{", self.name)?;
        let mut first = true;
        for field in &self.fields {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            write!(f, " {}: {}", field.name, field.value)?;
        }
        write!(f, " }}")
    }
}
