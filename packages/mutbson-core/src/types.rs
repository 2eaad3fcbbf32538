use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type tag of a document node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BsonType {
    MinKey,
    Double,
    String,
    Object,
    Array,
    Binary,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    DbRef,
    Code,
    Symbol,
    Int32,
    Timestamp,
    Int64,
    MaxKey,
}

impl BsonType {
    /// Wire type code.
    pub fn code(self) -> i8 {
        match self {
            BsonType::MinKey => -1,
            BsonType::Double => 1,
            BsonType::String => 2,
            BsonType::Object => 3,
            BsonType::Array => 4,
            BsonType::Binary => 5,
            BsonType::ObjectId => 7,
            BsonType::Bool => 8,
            BsonType::Date => 9,
            BsonType::Null => 10,
            BsonType::Regex => 11,
            BsonType::DbRef => 12,
            BsonType::Code => 13,
            BsonType::Symbol => 14,
            BsonType::Int32 => 16,
            BsonType::Timestamp => 17,
            BsonType::Int64 => 18,
            BsonType::MaxKey => 127,
        }
    }

    /// Position in the cross-type sort order. Numeric types share a rank, as do
    /// strings and symbols.
    pub fn canonical_rank(self) -> i32 {
        match self {
            BsonType::MinKey => -1,
            BsonType::Null => 5,
            BsonType::Double | BsonType::Int32 | BsonType::Int64 => 10,
            BsonType::String | BsonType::Symbol => 15,
            BsonType::Object => 20,
            BsonType::Array => 25,
            BsonType::Binary => 30,
            BsonType::ObjectId => 35,
            BsonType::Bool => 40,
            BsonType::Date => 45,
            BsonType::Timestamp => 47,
            BsonType::Regex => 50,
            BsonType::DbRef => 55,
            BsonType::Code => 60,
            BsonType::MaxKey => 127,
        }
    }

    /// Objects and arrays own child nodes; nothing else may.
    pub fn is_container(self) -> bool {
        matches!(self, BsonType::Object | BsonType::Array)
    }

    pub fn is_number(self) -> bool {
        matches!(self, BsonType::Double | BsonType::Int32 | BsonType::Int64)
    }

    pub(crate) fn is_string_bodied(self) -> bool {
        matches!(self, BsonType::String | BsonType::Code | BsonType::Symbol)
    }
}

/// 12-byte object identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub [u8; 12]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 24 || !s.is_ascii() {
            return Err(Error::BadValue(format!("invalid ObjectId hex string: {s:?}")));
        }
        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::BadValue(format!("invalid ObjectId hex string: {s:?}")))?;
        }
        Ok(Self(bytes))
    }
}

/// Replication timestamp: seconds plus an ordinal within the second.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    pub time: u32,
    pub increment: u32,
}

impl Timestamp {
    pub fn new(time: u32, increment: u32) -> Self {
        Self { time, increment }
    }
}
