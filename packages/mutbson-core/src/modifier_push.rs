use crate::compare::{sort_children, SortPattern};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::modifier::{log_set, ExecInfo, Modifier};
use crate::path::{bind_positional, check_storable, check_updatable, find_longest_prefix, FieldRef};
use crate::value::Value;

/// `$push`: appends one value, or the `$each` list, to an array, then optionally sorts
/// the whole array and keeps only its tail (`$slice`).
///
/// Accepted forms:
///
/// ```text
/// { <path>: <value> }
/// { <path>: { $each: [ ... ] } }
/// { <path>: { $each: [ ... ], $slice: <n <= 0> } }
/// { <path>: { $each: [ {...}, ... ], $slice: <n <= 0>, $sort: { <field>: 1 | -1, ... } } }
/// ```
///
/// Clauses may appear in any order. A missing target array is created, along with any
/// missing parent objects.
#[derive(Clone, Debug)]
pub struct ModifierPush {
    field: FieldRef,
    each: Vec<Value>,
    slice: Option<i64>,
    sort: Option<SortPattern>,
    prepared: Option<PreparedPush>,
    applied: bool,
}

#[derive(Clone, Debug)]
struct PreparedPush {
    field: FieldRef,
    root: Element,
    target: PushTarget,
    /// The array that was written to, once applied.
    array: Option<Element>,
}

#[derive(Clone, Copy, Debug)]
enum PushTarget {
    Existing(Element),
    /// Parts from `first_missing` on are created below `parent`.
    Create { parent: Element, first_missing: usize },
}

impl ModifierPush {
    pub fn init(field_path: &str, arg: &Value) -> Result<Self> {
        let field = FieldRef::parse(field_path);
        check_updatable(&field)?;
        let mut push = Self {
            field,
            each: Vec::new(),
            slice: None,
            sort: None,
            prepared: None,
            applied: false,
        };
        match arg {
            Value::Document(clauses) if clauses.iter().any(|(k, _)| k == "$each") => {
                push.parse_clauses(clauses)?;
            }
            value => {
                check_storable(value)?;
                push.each.push(value.clone());
            }
        }
        Ok(push)
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn slice(&self) -> Option<i64> {
        self.slice
    }

    pub fn sort(&self) -> Option<&SortPattern> {
        self.sort.as_ref()
    }

    /// Where the array for `field` is, or from which element it has to be created.
    fn resolve(&self, doc: &Document, root: Element, field: &FieldRef) -> Result<PushTarget> {
        let last = field.num_parts() - 1;
        match find_longest_prefix(doc, root, field)? {
            Some((idx, e)) if idx == last => {
                if !doc.is_array(e) {
                    return Err(Error::BadValue(format!(
                        "the field '{field}' must be an array but is of type {:?}",
                        doc.element_type(e)?
                    )));
                }
                if self.sort.is_some() && doc.children(e).any(|c| !doc.is_object(c)) {
                    return Err(Error::BadValue(format!(
                        "$sort requires the array at '{field}' to hold only objects"
                    )));
                }
                Ok(PushTarget::Existing(e))
            }
            Some((idx, e)) => {
                if !doc.is_object(e) {
                    return Err(Error::BadValue(format!(
                        "cannot create field '{}' in element of type {:?}",
                        field.part(idx + 1),
                        doc.element_type(e)?
                    )));
                }
                Ok(PushTarget::Create {
                    parent: e,
                    first_missing: idx + 1,
                })
            }
            None => Ok(PushTarget::Create {
                parent: root,
                first_missing: 0,
            }),
        }
    }

    fn parse_clauses(&mut self, clauses: &[(String, Value)]) -> Result<()> {
        let mut seen_each = false;
        let mut sort = None;
        for (name, value) in clauses {
            let duplicate = match name.as_str() {
                "$each" => {
                    let dup = seen_each;
                    seen_each = true;
                    let Value::Array(items) = value else {
                        return Err(Error::BadValue(format!(
                            "$each must be an array, got {:?}",
                            value.bson_type()
                        )));
                    };
                    items.iter().try_for_each(check_storable)?;
                    self.each = items.clone();
                    dup
                }
                "$slice" => {
                    let dup = self.slice.is_some();
                    self.slice = Some(parse_slice(value)?);
                    dup
                }
                "$sort" => sort.replace(value).is_some(),
                other => {
                    return Err(Error::BadValue(format!(
                        "unrecognized clause in $push: {other}"
                    )))
                }
            };
            if duplicate {
                return Err(Error::BadValue(format!(
                    "only one {name} clause is allowed in $push"
                )));
            }
        }

        if let Some(pattern) = sort {
            if self.slice.is_none() {
                return Err(Error::BadValue("$sort requires $slice to be present".into()));
            }
            self.sort = Some(SortPattern::parse(pattern)?);
            if self.each.iter().any(|v| !v.is_document()) {
                return Err(Error::BadValue(
                    "$sort requires $each to hold only objects".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `$slice` takes an integral number no greater than zero; `-2.0` is fine, `-2.1` is not.
fn parse_slice(value: &Value) -> Result<i64> {
    let n = match *value {
        Value::Int32(n) => i64::from(n),
        Value::Int64(n) => n,
        Value::Double(d) if d.is_finite() && d.fract() == 0.0 => d as i64,
        Value::Double(d) => {
            return Err(Error::BadValue(format!("$slice must be an integer, got {d}")))
        }
        _ => {
            return Err(Error::BadValue(format!(
                "$slice must be a number, got {:?}",
                value.bson_type()
            )))
        }
    };
    if n > 0 {
        return Err(Error::BadValue(format!(
            "$slice must be a number less than or equal to 0, got {n}"
        )));
    }
    Ok(n)
}

impl Modifier for ModifierPush {
    fn prepare(&mut self, doc: &Document, root: Element, matched_field: &str) -> Result<ExecInfo> {
        let field = bind_positional(&self.field, matched_field)?;
        let target = self.resolve(doc, root, &field)?;
        self.prepared = Some(PreparedPush {
            field: field.clone(),
            root,
            target,
            array: None,
        });
        self.applied = false;
        Ok(ExecInfo {
            field_ref: Some(field),
            no_op: false,
            in_place: false,
        })
    }

    fn apply(&mut self, doc: &mut Document) -> Result<()> {
        let Some(prepared) = self.prepared.as_ref() else {
            return Err(Error::IllegalOperation(
                "$push must be prepared before it is applied".into(),
            ));
        };
        if self.applied {
            return Err(Error::IllegalOperation("$push was already applied".into()));
        }

        // Modifiers applied since prepare may have created part of a missing path.
        let target = match prepared.target {
            PushTarget::Existing(e) => PushTarget::Existing(e),
            PushTarget::Create { .. } => self.resolve(doc, prepared.root, &prepared.field)?,
        };
        let field = prepared.field.clone();
        let arr = match target {
            PushTarget::Existing(e) => e,
            PushTarget::Create {
                parent,
                first_missing,
            } => {
                let last = field.num_parts() - 1;
                let mut at = parent;
                for i in first_missing..last {
                    at = doc.append_object(at, field.part(i))?;
                }
                doc.append_array(at, field.part(last))?
            }
        };

        for value in &self.each {
            doc.append_value(arr, "", value)?;
        }
        if let Some(pattern) = &self.sort {
            sort_children(doc, arr, |a, b| pattern.compare(a, b))?;
        }
        if let Some(slice) = self.slice {
            let keep = slice.unsigned_abs() as usize;
            let size = doc.array_size(arr)?;
            for _ in keep..size {
                doc.pop_front(arr)?;
            }
        }
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.array = Some(arr);
        }
        self.applied = true;
        Ok(())
    }

    fn log(&self, doc: &Document, log_doc: &mut Document, log_root: Element) -> Result<()> {
        let prepared = self.prepared.as_ref().ok_or_else(|| {
            Error::IllegalOperation("$push must be prepared before it is logged".into())
        })?;
        let arr = match (prepared.target, prepared.array) {
            (_, Some(arr)) | (PushTarget::Existing(arr), None) => arr,
            (PushTarget::Create { .. }, None) => {
                return Err(Error::IllegalOperation(
                    "$push must be applied before a created array can be logged".into(),
                ))
            }
        };
        log_set(doc, arr, log_doc, log_root, &prepared.field)
    }
}
