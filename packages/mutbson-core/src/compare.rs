use std::cmp::Ordering;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::path::FieldRef;
use crate::safe_num::SafeNum;
use crate::value::Value;

/// Total order across all value types: canonical type rank first, then the values.
/// Numbers of different widths compare numerically.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = a
        .bson_type()
        .canonical_rank()
        .cmp(&b.bson_type().canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Value::String(x) | Value::Symbol(x), Value::String(y) | Value::Symbol(y)) => x.cmp(y),
        (Value::Code(x), Value::Code(y)) => x.cmp(y),
        (Value::Document(x), Value::Document(y)) => compare_fields(x, y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| compare_values(l, r))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (
            Value::Binary { subtype: ls, bytes: lb },
            Value::Binary { subtype: rs, bytes: rb },
        ) => lb.len().cmp(&rb.len()).then(ls.cmp(rs)).then_with(|| lb.cmp(rb)),
        (Value::ObjectId(x), Value::ObjectId(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (
            Value::Regex { pattern: lp, flags: lf },
            Value::Regex { pattern: rp, flags: rf },
        ) => lp.cmp(rp).then_with(|| lf.cmp(rf)),
        (Value::DbRef { ns: ln, id: li }, Value::DbRef { ns: rn, id: ri }) => {
            ln.cmp(rn).then_with(|| li.cmp(ri))
        }
        _ => match (a.as_safe_num(), b.as_safe_num()) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => Ordering::Equal,
        },
    }
}

fn compare_fields(x: &[(String, Value)], y: &[(String, Value)]) -> Ordering {
    for ((ln, lv), (rn, rv)) in x.iter().zip(y) {
        let ord = lv
            .bson_type()
            .canonical_rank()
            .cmp(&rv.bson_type().canonical_rank())
            .then_with(|| ln.cmp(rn))
            .then_with(|| compare_values(lv, rv));
        if ord.is_ne() {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}

fn compare_numbers(a: SafeNum, b: SafeNum) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    // NaN sorts below every other number
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Field-weighted ordering over objects, e.g. `{ a: 1, "b.c": -1 }`.
///
/// Each object is projected onto the pattern's dotted fields; a missing field compares
/// as null.
#[derive(Clone, Debug, PartialEq)]
pub struct SortPattern {
    keys: Vec<(FieldRef, SortDirection)>,
}

impl SortPattern {
    pub fn parse(pattern: &Value) -> Result<Self> {
        let Value::Document(fields) = pattern else {
            return Err(Error::BadValue(format!(
                "$sort pattern must be an object, got {:?}",
                pattern.bson_type()
            )));
        };
        if fields.is_empty() {
            return Err(Error::BadValue("$sort pattern must not be empty".into()));
        }
        let mut keys = Vec::with_capacity(fields.len());
        for (name, direction) in fields {
            let field = FieldRef::parse(name);
            if name.is_empty() || field.has_empty_part() {
                return Err(Error::BadValue(format!(
                    "$sort field {name:?} is not a valid dotted path"
                )));
            }
            let direction = match direction.as_safe_num().map(SafeNum::as_f64) {
                Some(d) if d == 1.0 => SortDirection::Ascending,
                Some(d) if d == -1.0 => SortDirection::Descending,
                _ => {
                    return Err(Error::BadValue(format!(
                        "$sort direction for {name:?} must be 1 or -1, got {direction}"
                    )))
                }
            };
            keys.push((field, direction));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[(FieldRef, SortDirection)] {
        &self.keys
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, direction) in &self.keys {
            let l = lookup(a, field).unwrap_or(&Value::Null);
            let r = lookup(b, field).unwrap_or(&Value::Null);
            let ord = compare_values(l, r);
            let ord = match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord.is_ne() {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Value at a dotted path inside `value`; numeric parts index arrays.
pub fn lookup<'a>(value: &'a Value, field: &FieldRef) -> Option<&'a Value> {
    let mut cur = value;
    for part in field.parts() {
        cur = match cur {
            Value::Document(_) => cur.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Stable sort of the children of `parent` by their exported values.
pub fn sort_children<F>(doc: &mut Document, parent: Element, mut cmp: F) -> Result<()>
where
    F: FnMut(&Value, &Value) -> Ordering,
{
    let mut keyed = Vec::new();
    for child in doc.children(parent) {
        keyed.push((child, doc.to_value(child)?));
    }
    keyed.sort_by(|a, b| cmp(&a.1, &b.1));
    for (child, _) in &keyed {
        doc.remove(*child)?;
    }
    for (child, _) in keyed {
        doc.add_child(parent, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_across_widths() {
        assert_eq!(compare_values(&Value::Int32(2), &Value::Int64(2)), Ordering::Equal);
        assert_eq!(compare_values(&Value::Int32(2), &Value::Double(2.5)), Ordering::Less);
        assert_eq!(compare_values(&Value::Double(f64::NAN), &Value::Int32(-9)), Ordering::Less);
    }

    #[test]
    fn type_rank_dominates() {
        assert_eq!(compare_values(&Value::Null, &Value::Int32(0)), Ordering::Less);
        assert_eq!(compare_values(&Value::from("a"), &Value::Int32(7)), Ordering::Greater);
        assert_eq!(compare_values(&Value::MaxKey, &Value::Bool(true)), Ordering::Greater);
        assert_eq!(compare_values(&Value::MinKey, &Value::Null), Ordering::Less);
    }

    #[test]
    fn documents_compare_field_by_field() {
        let a = Value::doc([("a", 1), ("b", 1)]);
        let b = Value::doc([("a", 1), ("b", 2)]);
        let c = Value::doc([("a", 1)]);
        assert_eq!(compare_values(&a, &b), Ordering::Less);
        assert_eq!(compare_values(&c, &a), Ordering::Less);
        assert_eq!(compare_values(&a, &a.clone()), Ordering::Equal);
    }

    #[test]
    fn parse_rejects_bad_patterns() {
        for bad in [
            Value::from(1),
            Value::empty_doc(),
            Value::doc([("a", 2)]),
            Value::doc([("a", Value::from("x"))]),
            Value::doc([("", 1)]),
            Value::doc([(".", 1)]),
            Value::doc([("a.", 1)]),
            Value::doc([(".b", 1)]),
            Value::doc([("a..b", 1)]),
        ] {
            assert!(SortPattern::parse(&bad).is_err(), "{bad} should be rejected");
        }
        assert!(SortPattern::parse(&Value::doc([("a", Value::Double(-1.0))])).is_ok());
    }

    #[test]
    fn missing_fields_sort_as_null() {
        let pattern = SortPattern::parse(&Value::doc([("b", 1), ("c", 1)])).unwrap();
        let a = Value::doc([("a", 1)]);
        let b = Value::doc([("a", 2), ("b", 2)]);
        assert_eq!(pattern.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn nested_descending_key() {
        let pattern = SortPattern::parse(&Value::doc([("a.b", -1)])).unwrap();
        let lo = Value::doc([("a", Value::doc([("b", 1)]))]);
        let hi = Value::doc([("a", Value::doc([("b", 5)]))]);
        assert_eq!(pattern.compare(&hi, &lo), Ordering::Less);
    }

    #[test]
    fn sort_children_is_stable() {
        let mut doc = Document::from_value(&Value::doc([(
            "a",
            Value::array([
                Value::doc([("k", 2), ("id", 0)]),
                Value::doc([("k", 1), ("id", 1)]),
                Value::doc([("k", 2), ("id", 2)]),
            ]),
        )]))
        .unwrap();
        let arr = doc.left_child(doc.root()).unwrap();
        let pattern = SortPattern::parse(&Value::doc([("k", 1)])).unwrap();
        sort_children(&mut doc, arr, |l, r| pattern.compare(l, r)).unwrap();
        let ids: Vec<_> = doc
            .children(arr)
            .map(|c| doc.to_value(c).unwrap().get("id").cloned().unwrap())
            .collect();
        assert_eq!(ids, [Value::Int32(1), Value::Int32(0), Value::Int32(2)]);
        doc.validate_invariants().unwrap();
    }
}
