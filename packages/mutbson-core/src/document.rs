use crate::config::DocumentOptions;
use crate::dup_set::SmallDupSet;
use crate::error::{Error, Result};
use crate::heap::Heap;
use crate::ids::{Element, EMPTY_REP};
use crate::safe_num::SafeNum;
use crate::table::{ElementRep, ElementTable, ValueRep};
use crate::types::{BsonType, ObjectId, Timestamp};
use crate::value::Value;

/// Owns the heap and element table of one mutable document tree.
///
/// The root is an empty-named object created with the document. Factories append
/// unattached nodes; attach them with [`Document::add_child`] and friends.
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) heap: Heap,
    pub(crate) elements: ElementTable,
    root: Element,
    options: DocumentOptions,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        let mut doc = Self {
            heap: Heap::with_capacity(options.heap_capacity),
            elements: ElementTable::with_capacity(options.element_capacity),
            root: Element(0),
            options,
        };
        doc.root = doc.make_object_element("");
        doc
    }

    /// Builds a document whose root holds the fields of `value`, which must be a document.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Document(fields) = value else {
            return Err(Error::BadValue(format!(
                "document root must be an object, got {:?}",
                value.bson_type()
            )));
        };
        let mut doc = Self::new();
        let root = doc.root();
        for (name, field) in fields {
            doc.append_value(root, name, field)?;
        }
        Ok(doc)
    }

    pub fn root(&self) -> Element {
        self.root
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Number of allocated slots, attached or not.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Exports the whole document.
    pub fn to_object(&self) -> Result<Value> {
        self.to_value(self.root)
    }

    /// Exports the subtree rooted at `e` as an owned value. Array child names are dropped.
    ///
    /// Fails with `BadValue` when containers nest more than
    /// [`DocumentOptions::max_nesting`] levels below `e`.
    pub fn to_value(&self, e: Element) -> Result<Value> {
        self.export(e, 0)
    }

    fn export(&self, e: Element, depth: usize) -> Result<Value> {
        let rep = self.rep(e)?;
        if rep.kind.is_container() {
            self.check_nesting(depth)?;
        }
        Ok(match rep.kind {
            BsonType::Object => {
                let mut fields = Vec::new();
                for child in self.children(e) {
                    let value = self.export(child, depth + 1)?;
                    fields.push((self.field_name(child)?.to_owned(), value));
                }
                Value::Document(fields)
            }
            BsonType::Array => {
                let mut items = Vec::new();
                for child in self.children(e) {
                    items.push(self.export(child, depth + 1)?);
                }
                Value::Array(items)
            }
            BsonType::MinKey => Value::MinKey,
            BsonType::MaxKey => Value::MaxKey,
            BsonType::Null => Value::Null,
            BsonType::String => Value::String(self.read_str(&rep.value)?.to_owned()),
            BsonType::Code => Value::Code(self.read_str(&rep.value)?.to_owned()),
            BsonType::Symbol => Value::Symbol(self.read_str(&rep.value)?.to_owned()),
            _ => self.scalar_value(rep)?,
        })
    }

    fn check_nesting(&self, depth: usize) -> Result<()> {
        let max = self.options.max_nesting;
        if depth > max {
            return Err(Error::BadValue(format!(
                "document nesting exceeds the limit of {max} levels"
            )));
        }
        Ok(())
    }

    fn scalar_value(&self, rep: &ElementRep) -> Result<Value> {
        Ok(match rep.value {
            ValueRep::Bool(v) => Value::Bool(v),
            ValueRep::Int32(v) => Value::Int32(v),
            ValueRep::Int64(v) => Value::Int64(v),
            ValueRep::Double(v) => Value::Double(v),
            ValueRep::Date(v) => Value::Date(v),
            ValueRep::Timestamp(v) => Value::Timestamp(v),
            ValueRep::ObjectId(v) => Value::ObjectId(v),
            ValueRep::Regex { pattern, flags } => Value::Regex {
                pattern: self.heap_str(pattern)?.to_owned(),
                flags: self.heap_str(flags)?.to_owned(),
            },
            ValueRep::Binary { subtype, data } => Value::Binary {
                subtype,
                bytes: self.heap_bytes(data)?.to_vec(),
            },
            ValueRep::DbRef { ns, id } => Value::DbRef {
                ns: self.heap_str(ns)?.to_owned(),
                id,
            },
            ValueRep::Empty | ValueRep::Inline { .. } | ValueRep::Heap(_) => {
                return Err(Error::InternalError(format!(
                    "{:?} element carries a mismatched payload",
                    rep.kind
                )))
            }
        })
    }

    /// Checks link consistency of the tree reachable from the root.
    pub fn validate_invariants(&self) -> Result<()> {
        let root = self.rep(self.root)?;
        if !root.is_clean() {
            return Err(Error::InternalError("root has a parent or siblings".into()));
        }
        let mut seen = SmallDupSet::new();
        let mut pending = vec![self.root.0];
        while let Some(idx) = pending.pop() {
            if seen.get_set_dup(idx) {
                return Err(Error::InternalError(format!("element #{idx} reached twice")));
            }
            let rep = self.rep(Element(idx))?;
            if !rep.kind.is_container() && rep.left_child != EMPTY_REP {
                return Err(Error::InternalError(format!("scalar element #{idx} has children")));
            }
            let mut prev = EMPTY_REP;
            let mut cur = rep.left_child;
            let mut steps = 0usize;
            while cur != EMPTY_REP {
                steps += 1;
                if steps > self.elements.len() {
                    return Err(Error::InternalError(format!("sibling loop under #{idx}")));
                }
                let child = self.rep(Element(cur))?;
                if child.parent != idx {
                    return Err(Error::InternalError(format!("child #{cur} parent mismatch")));
                }
                if child.left_sibling != prev {
                    return Err(Error::InternalError(format!("child #{cur} left link mismatch")));
                }
                pending.push(cur);
                prev = cur;
                cur = child.right_sibling;
            }
            if rep.right_child != prev {
                return Err(Error::InternalError(format!("element #{idx} right child mismatch")));
            }
        }
        Ok(())
    }

    pub(crate) fn rep(&self, e: Element) -> Result<&ElementRep> {
        self.elements
            .get(e.0)
            .ok_or_else(|| Error::IllegalOperation(format!("invalid element handle {e}")))
    }

    pub(crate) fn rep_mut(&mut self, e: Element) -> Result<&mut ElementRep> {
        self.elements
            .get_mut(e.0)
            .ok_or_else(|| Error::IllegalOperation(format!("invalid element handle {e}")))
    }

    pub(crate) fn heap_str(&self, at: crate::ids::HeapRef) -> Result<&str> {
        self.heap
            .get_str(at)
            .ok_or_else(|| Error::InternalError(format!("no string at heap offset {}", at.offset())))
    }

    pub(crate) fn heap_bytes(&self, at: crate::ids::HeapRef) -> Result<&[u8]> {
        self.heap
            .get_bytes(at)
            .ok_or_else(|| Error::InternalError(format!("no bytes at heap offset {}", at.offset())))
    }

    pub(crate) fn read_str<'a>(&'a self, value: &'a ValueRep) -> Result<&'a str> {
        match value {
            ValueRep::Inline { len, bytes } => std::str::from_utf8(&bytes[..*len as usize])
                .map_err(|e| Error::InternalError(format!("corrupt inline string: {e}"))),
            ValueRep::Heap(at) => self.heap_str(*at),
            other => Err(Error::InternalError(format!("not a string payload: {other:?}"))),
        }
    }

    /// Inline when short, otherwise copied to the heap.
    pub(crate) fn string_rep(&mut self, s: &str) -> ValueRep {
        match ValueRep::inline_str(s) {
            Some(inline) => inline,
            None => ValueRep::Heap(self.heap.put_str(s)),
        }
    }

    fn make(&mut self, name: &str, kind: BsonType, value: ValueRep) -> Element {
        let name = self.heap.put_str(name);
        Element(self.elements.push(ElementRep::new(kind, name, value)))
    }

    pub fn make_object_element(&mut self, name: &str) -> Element {
        self.make(name, BsonType::Object, ValueRep::Empty)
    }

    pub fn make_array_element(&mut self, name: &str) -> Element {
        self.make(name, BsonType::Array, ValueRep::Empty)
    }

    pub fn make_null_element(&mut self, name: &str) -> Element {
        self.make(name, BsonType::Null, ValueRep::Empty)
    }

    pub fn make_min_key_element(&mut self, name: &str) -> Element {
        self.make(name, BsonType::MinKey, ValueRep::Empty)
    }

    pub fn make_max_key_element(&mut self, name: &str) -> Element {
        self.make(name, BsonType::MaxKey, ValueRep::Empty)
    }

    pub fn make_bool_element(&mut self, name: &str, v: bool) -> Element {
        self.make(name, BsonType::Bool, ValueRep::Bool(v))
    }

    pub fn make_int_element(&mut self, name: &str, v: i32) -> Element {
        self.make(name, BsonType::Int32, ValueRep::Int32(v))
    }

    pub fn make_long_element(&mut self, name: &str, v: i64) -> Element {
        self.make(name, BsonType::Int64, ValueRep::Int64(v))
    }

    pub fn make_double_element(&mut self, name: &str, v: f64) -> Element {
        self.make(name, BsonType::Double, ValueRep::Double(v))
    }

    pub fn make_timestamp_element(&mut self, name: &str, v: Timestamp) -> Element {
        self.make(name, BsonType::Timestamp, ValueRep::Timestamp(v))
    }

    /// `millis` since the Unix epoch.
    pub fn make_date_element(&mut self, name: &str, millis: i64) -> Element {
        self.make(name, BsonType::Date, ValueRep::Date(millis))
    }

    pub fn make_oid_element(&mut self, name: &str, v: ObjectId) -> Element {
        self.make(name, BsonType::ObjectId, ValueRep::ObjectId(v))
    }

    pub fn make_string_element(&mut self, name: &str, v: &str) -> Element {
        let value = self.string_rep(v);
        self.make(name, BsonType::String, value)
    }

    pub fn make_code_element(&mut self, name: &str, code: &str) -> Element {
        let value = self.string_rep(code);
        self.make(name, BsonType::Code, value)
    }

    pub fn make_symbol_element(&mut self, name: &str, symbol: &str) -> Element {
        let value = self.string_rep(symbol);
        self.make(name, BsonType::Symbol, value)
    }

    pub fn make_regex_element(&mut self, name: &str, pattern: &str, flags: &str) -> Element {
        let pattern = self.heap.put_str(pattern);
        let flags = self.heap.put_str(flags);
        self.make(name, BsonType::Regex, ValueRep::Regex { pattern, flags })
    }

    pub fn make_binary_element(&mut self, name: &str, subtype: u8, bytes: &[u8]) -> Element {
        let data = self.heap.put_bytes(bytes);
        self.make(name, BsonType::Binary, ValueRep::Binary { subtype, data })
    }

    pub fn make_dbref_element(&mut self, name: &str, ns: &str, id: ObjectId) -> Element {
        let ns = self.heap.put_str(ns);
        self.make(name, BsonType::DbRef, ValueRep::DbRef { ns, id })
    }

    pub fn make_safe_num_element(&mut self, name: &str, v: SafeNum) -> Element {
        match v {
            SafeNum::Int32(v) => self.make_int_element(name, v),
            SafeNum::Int64(v) => self.make_long_element(name, v),
            SafeNum::Double(v) => self.make_double_element(name, v),
        }
    }

    /// Builds an unattached subtree holding `value`, under the same nesting bound as
    /// [`Document::to_value`].
    pub fn make_element(&mut self, name: &str, value: &Value) -> Result<Element> {
        self.import(name, value, 0)
    }

    fn import(&mut self, name: &str, value: &Value, depth: usize) -> Result<Element> {
        if matches!(value, Value::Document(_) | Value::Array(_)) {
            self.check_nesting(depth)?;
        }
        Ok(match value {
            Value::Document(fields) => {
                let obj = self.make_object_element(name);
                for (k, v) in fields {
                    let child = self.import(k, v, depth + 1)?;
                    self.add_child(obj, child)?;
                }
                obj
            }
            Value::Array(items) => {
                let arr = self.make_array_element(name);
                for v in items {
                    let child = self.import("", v, depth + 1)?;
                    self.add_child(arr, child)?;
                }
                arr
            }
            Value::MinKey => self.make_min_key_element(name),
            Value::MaxKey => self.make_max_key_element(name),
            Value::Null => self.make_null_element(name),
            Value::Double(v) => self.make_double_element(name, *v),
            Value::String(s) => self.make_string_element(name, s),
            Value::Binary { subtype, bytes } => self.make_binary_element(name, *subtype, bytes),
            Value::ObjectId(id) => self.make_oid_element(name, *id),
            Value::Bool(v) => self.make_bool_element(name, *v),
            Value::Date(ms) => self.make_date_element(name, *ms),
            Value::Regex { pattern, flags } => self.make_regex_element(name, pattern, flags),
            Value::DbRef { ns, id } => self.make_dbref_element(name, ns, *id),
            Value::Code(s) => self.make_code_element(name, s),
            Value::Symbol(s) => self.make_symbol_element(name, s),
            Value::Int32(v) => self.make_int_element(name, *v),
            Value::Timestamp(ts) => self.make_timestamp_element(name, *ts),
            Value::Int64(v) => self.make_long_element(name, *v),
        })
    }

    /// Deep-copies `e` out of `src` as a new unattached subtree of this document.
    pub fn copy_from(&mut self, src: &Document, e: Element, name: &str) -> Result<Element> {
        let value = src.to_value(e)?;
        self.make_element(name, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_empty_root() {
        let doc = Document::new();
        assert_eq!(doc.element_count(), 1);
        assert_eq!(doc.field_name(doc.root()).unwrap(), "");
        assert_eq!(doc.element_type(doc.root()).unwrap(), BsonType::Object);
        assert_eq!(doc.to_object().unwrap(), Value::empty_doc());
        doc.validate_invariants().unwrap();
    }

    #[test]
    fn from_value_round_trips() {
        let value = Value::doc([
            ("a", Value::array([Value::from(1), Value::from("two"), Value::Null])),
            ("b", Value::doc([("c", Value::Int64(9)), ("d", Value::Double(0.5))])),
            ("e", Value::Regex { pattern: "^x".into(), flags: "i".into() }),
            ("f", Value::Binary { subtype: 0, bytes: vec![1, 0, 2] }),
            ("g", Value::Code("return 1".into())),
        ]);
        let doc = Document::from_value(&value).unwrap();
        doc.validate_invariants().unwrap();
        assert_eq!(doc.to_object().unwrap(), value);
    }

    #[test]
    fn from_value_rejects_non_documents() {
        assert!(matches!(Document::from_value(&Value::from(1)), Err(Error::BadValue(_))));
    }

    #[test]
    fn factories_leave_elements_detached() {
        let mut doc = Document::new();
        let e = doc.make_int_element("x", 3);
        assert_eq!(doc.parent(e), None);
        assert_eq!(doc.children(doc.root()).count(), 0);
    }

    #[test]
    fn invalid_handles_are_rejected() {
        let doc = Document::new();
        assert!(matches!(doc.to_value(Element(99)), Err(Error::IllegalOperation(_))));
    }

    #[test]
    fn copy_from_other_document() {
        let src = Document::from_value(&Value::doc([("a", Value::array([1, 2]))])).unwrap();
        let a = src.left_child(src.root()).unwrap();
        let mut dst = Document::new();
        let copy = dst.copy_from(&src, a, "b").unwrap();
        let root = dst.root();
        dst.add_child(root, copy).unwrap();
        assert_eq!(dst.to_object().unwrap(), Value::doc([("b", Value::array([1, 2]))]));
    }
}
