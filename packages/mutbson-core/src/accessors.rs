use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::safe_num::SafeNum;
use crate::table::{ElementRep, ValueRep};
use crate::types::{BsonType, ObjectId, Timestamp};

fn mismatch(e: Element, want: &str, got: BsonType) -> Error {
    Error::IllegalOperation(format!("element {e} holds {got:?}, not {want}"))
}

/// Typed reads.
impl Document {
    pub fn is_number(&self, e: Element) -> bool {
        self.element_type(e).map(BsonType::is_number).unwrap_or(false)
    }

    /// Anything that cannot own children.
    pub fn is_simple_type(&self, e: Element) -> bool {
        self.element_type(e).map(|k| !k.is_container()).unwrap_or(false)
    }

    pub fn is_array(&self, e: Element) -> bool {
        matches!(self.element_type(e), Ok(BsonType::Array))
    }

    pub fn is_object(&self, e: Element) -> bool {
        matches!(self.element_type(e), Ok(BsonType::Object))
    }

    pub fn bool_value(&self, e: Element) -> Result<bool> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Bool(v) => Ok(v),
            _ => Err(mismatch(e, "a bool", rep.kind)),
        }
    }

    pub fn int_value(&self, e: Element) -> Result<i32> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Int32(v) => Ok(v),
            _ => Err(mismatch(e, "an int32", rep.kind)),
        }
    }

    pub fn long_value(&self, e: Element) -> Result<i64> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Int64(v) => Ok(v),
            _ => Err(mismatch(e, "an int64", rep.kind)),
        }
    }

    pub fn double_value(&self, e: Element) -> Result<f64> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Double(v) => Ok(v),
            _ => Err(mismatch(e, "a double", rep.kind)),
        }
    }

    pub fn date_value(&self, e: Element) -> Result<i64> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Date(v) => Ok(v),
            _ => Err(mismatch(e, "a date", rep.kind)),
        }
    }

    pub fn timestamp_value(&self, e: Element) -> Result<Timestamp> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Timestamp(v) => Ok(v),
            _ => Err(mismatch(e, "a timestamp", rep.kind)),
        }
    }

    pub fn oid_value(&self, e: Element) -> Result<ObjectId> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::ObjectId(v) => Ok(v),
            _ => Err(mismatch(e, "an ObjectId", rep.kind)),
        }
    }

    /// Body of a string, code or symbol element.
    pub fn string_value(&self, e: Element) -> Result<&str> {
        let rep = self.rep(e)?;
        if !rep.kind.is_string_bodied() {
            return Err(mismatch(e, "a string", rep.kind));
        }
        self.read_str(&rep.value)
    }

    /// `(pattern, flags)`.
    pub fn regex_value(&self, e: Element) -> Result<(&str, &str)> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Regex { pattern, flags } => Ok((self.heap_str(pattern)?, self.heap_str(flags)?)),
            _ => Err(mismatch(e, "a regex", rep.kind)),
        }
    }

    /// `(subtype, bytes)`.
    pub fn binary_value(&self, e: Element) -> Result<(u8, &[u8])> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Binary { subtype, data } => Ok((subtype, self.heap_bytes(data)?)),
            _ => Err(mismatch(e, "binary data", rep.kind)),
        }
    }

    /// `(namespace, id)`.
    pub fn dbref_value(&self, e: Element) -> Result<(&str, ObjectId)> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::DbRef { ns, id } => Ok((self.heap_str(ns)?, id)),
            _ => Err(mismatch(e, "a DBRef", rep.kind)),
        }
    }

    pub fn safe_num_value(&self, e: Element) -> Result<SafeNum> {
        let rep = self.rep(e)?;
        match rep.value {
            ValueRep::Int32(v) => Ok(SafeNum::Int32(v)),
            ValueRep::Int64(v) => Ok(SafeNum::Int64(v)),
            ValueRep::Double(v) => Ok(SafeNum::Double(v)),
            _ => Err(mismatch(e, "a number", rep.kind)),
        }
    }
}

/// Typed writes. Each rewrites both the type tag and the value, and refuses the root and
/// any element that currently has children.
impl Document {
    fn settable(&mut self, e: Element) -> Result<&mut ElementRep> {
        if e == self.root() {
            return Err(Error::IllegalOperation(
                "cannot set a value on the document root".into(),
            ));
        }
        let rep = self.rep_mut(e)?;
        if rep.left_child != crate::ids::EMPTY_REP {
            return Err(Error::IllegalOperation(format!(
                "cannot set a value on element {e}, it has children"
            )));
        }
        Ok(rep)
    }

    fn set(&mut self, e: Element, kind: BsonType, value: ValueRep) -> Result<()> {
        let rep = self.settable(e)?;
        rep.kind = kind;
        rep.value = value;
        Ok(())
    }

    pub fn set_bool_value(&mut self, e: Element, v: bool) -> Result<()> {
        self.set(e, BsonType::Bool, ValueRep::Bool(v))
    }

    pub fn set_int_value(&mut self, e: Element, v: i32) -> Result<()> {
        self.set(e, BsonType::Int32, ValueRep::Int32(v))
    }

    pub fn set_long_value(&mut self, e: Element, v: i64) -> Result<()> {
        self.set(e, BsonType::Int64, ValueRep::Int64(v))
    }

    pub fn set_double_value(&mut self, e: Element, v: f64) -> Result<()> {
        self.set(e, BsonType::Double, ValueRep::Double(v))
    }

    pub fn set_date_value(&mut self, e: Element, millis: i64) -> Result<()> {
        self.set(e, BsonType::Date, ValueRep::Date(millis))
    }

    pub fn set_timestamp_value(&mut self, e: Element, v: Timestamp) -> Result<()> {
        self.set(e, BsonType::Timestamp, ValueRep::Timestamp(v))
    }

    pub fn set_oid_value(&mut self, e: Element, v: ObjectId) -> Result<()> {
        self.set(e, BsonType::ObjectId, ValueRep::ObjectId(v))
    }

    /// Short strings are stored inline and leave the heap untouched.
    pub fn set_string_value(&mut self, e: Element, v: &str) -> Result<()> {
        self.settable(e)?;
        let value = self.string_rep(v);
        self.set(e, BsonType::String, value)
    }

    pub fn set_regex_value(&mut self, e: Element, pattern: &str, flags: &str) -> Result<()> {
        self.settable(e)?;
        let pattern = self.heap.put_str(pattern);
        let flags = self.heap.put_str(flags);
        self.set(e, BsonType::Regex, ValueRep::Regex { pattern, flags })
    }

    pub fn set_null_value(&mut self, e: Element) -> Result<()> {
        self.set(e, BsonType::Null, ValueRep::Empty)
    }

    pub fn set_safe_num_value(&mut self, e: Element, v: SafeNum) -> Result<()> {
        match v {
            SafeNum::Int32(v) => self.set_int_value(e, v),
            SafeNum::Int64(v) => self.set_long_value(e, v),
            SafeNum::Double(v) => self.set_double_value(e, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SHORT_STRING_LIMIT;

    #[test]
    fn getters_check_the_type() {
        let mut doc = Document::new();
        let e = doc.make_int_element("n", 5);
        assert_eq!(doc.int_value(e).unwrap(), 5);
        assert!(matches!(doc.long_value(e), Err(Error::IllegalOperation(_))));
        assert!(matches!(doc.string_value(e), Err(Error::IllegalOperation(_))));
        assert_eq!(doc.safe_num_value(e).unwrap(), SafeNum::Int32(5));
    }

    #[test]
    fn setters_rewrite_the_type() {
        let mut doc = Document::new();
        let e = doc.make_int_element("n", 5);
        doc.set_string_value(e, "five").unwrap();
        assert_eq!(doc.element_type(e).unwrap(), BsonType::String);
        assert_eq!(doc.string_value(e).unwrap(), "five");
        doc.set_safe_num_value(e, SafeNum::Double(2.5)).unwrap();
        assert_eq!(doc.double_value(e).unwrap(), 2.5);
    }

    #[test]
    fn short_strings_skip_the_heap() {
        let mut doc = Document::new();
        let e = doc.make_null_element("s");
        let before = doc.heap().len();
        let short = "x".repeat(SHORT_STRING_LIMIT - 1);
        doc.set_string_value(e, &short).unwrap();
        assert!(doc.is_inline(e));
        assert_eq!(doc.heap().len(), before);
        assert_eq!(doc.string_value(e).unwrap(), short);

        let long = "y".repeat(SHORT_STRING_LIMIT);
        doc.set_string_value(e, &long).unwrap();
        assert!(!doc.is_inline(e));
        assert!(doc.heap().len() > before);
        assert_eq!(doc.string_value(e).unwrap(), long);
    }

    #[test]
    fn containers_with_children_are_not_settable() {
        let mut doc = Document::new();
        let root = doc.root();
        assert!(doc.set_int_value(root, 1).is_err());
        let obj = doc.make_object_element("o");
        let child = doc.make_null_element("c");
        doc.add_child(obj, child).unwrap();
        assert!(doc.set_int_value(obj, 1).is_err());
        let empty = doc.make_array_element("a");
        doc.set_bool_value(empty, true).unwrap();
        assert!(doc.bool_value(empty).unwrap());
    }
}
