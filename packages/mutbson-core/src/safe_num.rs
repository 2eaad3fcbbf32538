#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::BsonType;

/// Numeric value that keeps its storage width and widens instead of overflowing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SafeNum {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

impl SafeNum {
    /// Picks the narrowest integer width that holds `v`.
    pub fn from_i64(v: i64) -> Self {
        match i32::try_from(v) {
            Ok(small) => SafeNum::Int32(small),
            Err(_) => SafeNum::Int64(v),
        }
    }

    pub fn bson_type(self) -> BsonType {
        match self {
            SafeNum::Int32(_) => BsonType::Int32,
            SafeNum::Int64(_) => BsonType::Int64,
            SafeNum::Double(_) => BsonType::Double,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            SafeNum::Int32(v) => f64::from(v),
            SafeNum::Int64(v) => v as f64,
            SafeNum::Double(v) => v,
        }
    }

    /// Integer view, if the value is an integer type.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            SafeNum::Int32(v) => Some(i64::from(v)),
            SafeNum::Int64(v) => Some(v),
            SafeNum::Double(_) => None,
        }
    }

    /// int32 + int32 widens to int64 on overflow; int64 widens to double. Any double
    /// operand makes the result a double.
    pub fn add(self, rhs: SafeNum) -> SafeNum {
        match (self, rhs) {
            (SafeNum::Int32(a), SafeNum::Int32(b)) => match a.checked_add(b) {
                Some(sum) => SafeNum::Int32(sum),
                None => SafeNum::Int64(i64::from(a) + i64::from(b)),
            },
            (SafeNum::Double(_), _) | (_, SafeNum::Double(_)) => {
                SafeNum::Double(self.as_f64() + rhs.as_f64())
            }
            _ => {
                let (a, b) = (self.as_i64().unwrap_or_default(), rhs.as_i64().unwrap_or_default());
                match a.checked_add(b) {
                    Some(sum) => SafeNum::Int64(sum),
                    None => SafeNum::Double(a as f64 + b as f64),
                }
            }
        }
    }
}

impl From<i32> for SafeNum {
    fn from(v: i32) -> Self {
        SafeNum::Int32(v)
    }
}

impl From<i64> for SafeNum {
    fn from(v: i64) -> Self {
        SafeNum::Int64(v)
    }
}

impl From<f64> for SafeNum {
    fn from(v: f64) -> Self {
        SafeNum::Double(v)
    }
}
