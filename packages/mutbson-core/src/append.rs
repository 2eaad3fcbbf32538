//! Streaming construction: every `append_*` makes an element and links it as the
//! rightmost child of `parent`.

use crate::document::Document;
use crate::error::Result;
use crate::ids::Element;
use crate::safe_num::SafeNum;
use crate::types::{ObjectId, Timestamp};
use crate::value::Value;

impl Document {
    fn append(&mut self, parent: Element, e: Element) -> Result<Element> {
        self.add_child(parent, e)?;
        Ok(e)
    }

    pub fn append_object(&mut self, parent: Element, name: &str) -> Result<Element> {
        let e = self.make_object_element(name);
        self.append(parent, e)
    }

    pub fn append_array(&mut self, parent: Element, name: &str) -> Result<Element> {
        let e = self.make_array_element(name);
        self.append(parent, e)
    }

    pub fn append_null(&mut self, parent: Element, name: &str) -> Result<Element> {
        let e = self.make_null_element(name);
        self.append(parent, e)
    }

    pub fn append_min_key(&mut self, parent: Element, name: &str) -> Result<Element> {
        let e = self.make_min_key_element(name);
        self.append(parent, e)
    }

    pub fn append_max_key(&mut self, parent: Element, name: &str) -> Result<Element> {
        let e = self.make_max_key_element(name);
        self.append(parent, e)
    }

    pub fn append_bool(&mut self, parent: Element, name: &str, v: bool) -> Result<Element> {
        let e = self.make_bool_element(name, v);
        self.append(parent, e)
    }

    pub fn append_int(&mut self, parent: Element, name: &str, v: i32) -> Result<Element> {
        let e = self.make_int_element(name, v);
        self.append(parent, e)
    }

    pub fn append_long(&mut self, parent: Element, name: &str, v: i64) -> Result<Element> {
        let e = self.make_long_element(name, v);
        self.append(parent, e)
    }

    pub fn append_double(&mut self, parent: Element, name: &str, v: f64) -> Result<Element> {
        let e = self.make_double_element(name, v);
        self.append(parent, e)
    }

    pub fn append_date(&mut self, parent: Element, name: &str, millis: i64) -> Result<Element> {
        let e = self.make_date_element(name, millis);
        self.append(parent, e)
    }

    pub fn append_timestamp(
        &mut self,
        parent: Element,
        name: &str,
        v: Timestamp,
    ) -> Result<Element> {
        let e = self.make_timestamp_element(name, v);
        self.append(parent, e)
    }

    pub fn append_oid(&mut self, parent: Element, name: &str, v: ObjectId) -> Result<Element> {
        let e = self.make_oid_element(name, v);
        self.append(parent, e)
    }

    pub fn append_string(&mut self, parent: Element, name: &str, v: &str) -> Result<Element> {
        let e = self.make_string_element(name, v);
        self.append(parent, e)
    }

    pub fn append_code(&mut self, parent: Element, name: &str, code: &str) -> Result<Element> {
        let e = self.make_code_element(name, code);
        self.append(parent, e)
    }

    pub fn append_symbol(&mut self, parent: Element, name: &str, v: &str) -> Result<Element> {
        let e = self.make_symbol_element(name, v);
        self.append(parent, e)
    }

    pub fn append_regex(
        &mut self,
        parent: Element,
        name: &str,
        pattern: &str,
        flags: &str,
    ) -> Result<Element> {
        let e = self.make_regex_element(name, pattern, flags);
        self.append(parent, e)
    }

    pub fn append_binary(
        &mut self,
        parent: Element,
        name: &str,
        subtype: u8,
        bytes: &[u8],
    ) -> Result<Element> {
        let e = self.make_binary_element(name, subtype, bytes);
        self.append(parent, e)
    }

    pub fn append_dbref(
        &mut self,
        parent: Element,
        name: &str,
        ns: &str,
        id: ObjectId,
    ) -> Result<Element> {
        let e = self.make_dbref_element(name, ns, id);
        self.append(parent, e)
    }

    pub fn append_safe_num(&mut self, parent: Element, name: &str, v: SafeNum) -> Result<Element> {
        let e = self.make_safe_num_element(name, v);
        self.append(parent, e)
    }

    pub fn append_value(&mut self, parent: Element, name: &str, value: &Value) -> Result<Element> {
        let e = self.make_element(name, value)?;
        self.append(parent, e)
    }
}
