//! Owned value tree used to build documents and to export them again.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::safe_num::SafeNum;
use crate::types::{BsonType, ObjectId, Timestamp};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    MinKey,
    Double(f64),
    String(String),
    /// Ordered fields; duplicate names are kept as written.
    Document(Vec<(String, Value)>),
    Array(Vec<Value>),
    Binary { subtype: u8, bytes: Vec<u8> },
    ObjectId(ObjectId),
    Bool(bool),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    Null,
    Regex { pattern: String, flags: String },
    DbRef { ns: String, id: ObjectId },
    Code(String),
    Symbol(String),
    Int32(i32),
    Timestamp(Timestamp),
    Int64(i64),
    MaxKey,
}

impl Value {
    pub fn doc<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Document(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn empty_doc() -> Self {
        Value::Document(Vec::new())
    }

    pub fn bson_type(&self) -> BsonType {
        match self {
            Value::MinKey => BsonType::MinKey,
            Value::Double(_) => BsonType::Double,
            Value::String(_) => BsonType::String,
            Value::Document(_) => BsonType::Object,
            Value::Array(_) => BsonType::Array,
            Value::Binary { .. } => BsonType::Binary,
            Value::ObjectId(_) => BsonType::ObjectId,
            Value::Bool(_) => BsonType::Bool,
            Value::Date(_) => BsonType::Date,
            Value::Null => BsonType::Null,
            Value::Regex { .. } => BsonType::Regex,
            Value::DbRef { .. } => BsonType::DbRef,
            Value::Code(_) => BsonType::Code,
            Value::Symbol(_) => BsonType::Symbol,
            Value::Int32(_) => BsonType::Int32,
            Value::Timestamp(_) => BsonType::Timestamp,
            Value::Int64(_) => BsonType::Int64,
            Value::MaxKey => BsonType::MaxKey,
        }
    }

    pub fn as_safe_num(&self) -> Option<SafeNum> {
        match *self {
            Value::Int32(v) => Some(SafeNum::Int32(v)),
            Value::Int64(v) => Some(SafeNum::Int64(v)),
            Value::Double(v) => Some(SafeNum::Double(v)),
            _ => None,
        }
    }

    /// First field named `name` of a document value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Document(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<SafeNum> for Value {
    fn from(v: SafeNum) -> Self {
        match v {
            SafeNum::Int32(v) => Value::Int32(v),
            SafeNum::Int64(v) => Value::Int64(v),
            SafeNum::Double(v) => Value::Double(v),
        }
    }
}

/// Shell-style rendering, e.g. `{ a: [ 1, "x" ] }`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::MinKey => f.write_str("MinKey"),
            Value::MaxKey => f.write_str("MaxKey"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Document(fields) => {
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str(" }")
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return f.write_str("[]");
                }
                f.write_str("[ ")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(" ]")
            }
            Value::Binary { subtype, bytes } => {
                write!(f, "BinData({subtype}, ")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                f.write_str(")")
            }
            Value::ObjectId(id) => write!(f, "ObjectId(\"{id}\")"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Date(ms) => write!(f, "Date({ms})"),
            Value::Null => f.write_str("null"),
            Value::Regex { pattern, flags } => write!(f, "/{pattern}/{flags}"),
            Value::DbRef { ns, id } => write!(f, "DBRef(\"{ns}\", \"{id}\")"),
            Value::Code(s) => write!(f, "Code({s:?})"),
            Value::Symbol(s) => write!(f, "Symbol({s:?})"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Timestamp(ts) => write!(f, "Timestamp({}, {})", ts.time, ts.increment),
            Value::Int64(v) => write!(f, "NumberLong({v})"),
        }
    }
}
