use std::fmt;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::types::BsonType;
use crate::value::Value;

/// Dotted field path such as `a.b.0.c`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    parts: Vec<String>,
}

impl FieldRef {
    /// Splits `dotted` on `.`; no validation.
    pub fn parse(dotted: &str) -> Self {
        Self {
            parts: dotted.split('.').map(str::to_owned).collect(),
        }
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    pub fn part(&self, i: usize) -> &str {
        &self.parts[i]
    }

    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(String::as_str)
    }

    pub fn set_part(&mut self, i: usize, part: &str) {
        self.parts[i] = part.to_owned();
    }

    pub fn dotted(&self) -> String {
        self.parts.join(".")
    }

    pub fn has_empty_part(&self) -> bool {
        self.parts.iter().any(String::is_empty)
    }

    /// Index of the positional `$` part, if any.
    pub fn positional_part(&self) -> Option<usize> {
        self.parts.iter().position(|p| p == "$")
    }

    pub fn common_prefix_len(&self, other: &FieldRef) -> usize {
        self.parts
            .iter()
            .zip(&other.parts)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// One path equals or contains the other; updates to both would overlap.
    pub fn conflicts_with(&self, other: &FieldRef) -> bool {
        self.common_prefix_len(other) == self.num_parts().min(other.num_parts())
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// A path may be the target of an update: non-empty parts, and `$` only as a single
/// positional part after the first.
pub fn check_updatable(field: &FieldRef) -> Result<()> {
    if field.num_parts() == 1 && field.part(0).is_empty() {
        return Err(Error::BadValue("update field path cannot be empty".into()));
    }
    if field.has_empty_part() {
        return Err(Error::BadValue(format!(
            "update field path '{field}' contains an empty part"
        )));
    }
    let mut positional = false;
    for (i, part) in field.parts().enumerate() {
        if !part.starts_with('$') {
            continue;
        }
        if part != "$" || i == 0 || positional {
            return Err(Error::BadValue(format!(
                "update field path '{field}' has an illegal part {part:?}"
            )));
        }
        positional = true;
    }
    Ok(())
}

/// Field names of stored documents may not start with `$` or contain `.`.
pub fn check_storable(value: &Value) -> Result<()> {
    match value {
        Value::Document(fields) => {
            for (name, v) in fields {
                if name.starts_with('$') || name.contains('.') {
                    return Err(Error::BadValue(format!(
                        "field name {name:?} is not valid for storage"
                    )));
                }
                check_storable(v)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(check_storable),
        _ => Ok(()),
    }
}

/// Replaces the positional `$` with the array index the query matched.
pub fn bind_positional(field: &FieldRef, matched_field: &str) -> Result<FieldRef> {
    let Some(i) = field.positional_part() else {
        return Ok(field.clone());
    };
    if matched_field.is_empty() {
        return Err(Error::BadValue(format!(
            "the positional operator in '{field}' did not find the match needed from the query"
        )));
    }
    let mut bound = field.clone();
    bound.set_part(i, matched_field);
    Ok(bound)
}

/// Walks `field` down from `root` as far as it exists.
///
/// Returns the index of the deepest part found with its element, or `None` when not even
/// the first part exists. Stepping into a scalar, or into an array by a non-numeric
/// part, is an error.
pub fn find_longest_prefix(
    doc: &Document,
    root: Element,
    field: &FieldRef,
) -> Result<Option<(usize, Element)>> {
    let mut cur = root;
    let mut found = None;
    for (i, part) in field.parts().enumerate() {
        let next = match doc.element_type(cur)? {
            BsonType::Object => doc
                .children(cur)
                .find(|&c| doc.field_name(c).map(|n| n == part).unwrap_or(false)),
            BsonType::Array if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) => {
                match part.parse::<usize>() {
                    Ok(index) => doc.children(cur).nth(index),
                    Err(_) => None,
                }
            }
            kind => {
                return Err(Error::BadValue(format!(
                    "cannot use the part ({part}) of ({field}) to traverse the element of type {kind:?}"
                )))
            }
        };
        match next {
            Some(e) => {
                cur = e;
                found = Some((i, e));
            }
            None => break,
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updatable_paths() {
        for ok in ["a", "a.b", "a.$", "a.$.b", "a.0"] {
            check_updatable(&FieldRef::parse(ok)).unwrap();
        }
        for bad in ["", ".", "a.", ".b", "a..b", "$inc", "$", "a.$x", "a.$.$"] {
            assert!(check_updatable(&FieldRef::parse(bad)).is_err(), "{bad}");
        }
    }

    #[test]
    fn storable_values() {
        check_storable(&Value::doc([("a", Value::array([Value::doc([("b", 1)])]))])).unwrap();
        assert!(check_storable(&Value::doc([("$inc", 1)])).is_err());
        assert!(check_storable(&Value::array([Value::doc([("a.b", 1)])])).is_err());
        check_storable(&Value::from("$notAField")).unwrap();
    }

    #[test]
    fn positional_binding() {
        let field = FieldRef::parse("a.$.b");
        assert_eq!(bind_positional(&field, "3").unwrap().dotted(), "a.3.b");
        assert!(bind_positional(&field, "").is_err());
        assert_eq!(bind_positional(&FieldRef::parse("x"), "").unwrap().dotted(), "x");
    }

    #[test]
    fn conflicts() {
        let ab = FieldRef::parse("a.b");
        assert!(ab.conflicts_with(&FieldRef::parse("a")));
        assert!(ab.conflicts_with(&FieldRef::parse("a.b.c")));
        assert!(!ab.conflicts_with(&FieldRef::parse("a.c")));
        assert!(!ab.conflicts_with(&FieldRef::parse("ab")));
    }

    #[test]
    fn longest_prefix() {
        let doc = Document::from_value(&Value::doc([
            ("a", Value::doc([("b", Value::doc([("c", Value::empty_doc())]))])),
            ("arr", Value::array([Value::doc([("x", 1)])])),
            ("s", Value::from("str")),
        ]))
        .unwrap();
        let root = doc.root();

        let (idx, _) = find_longest_prefix(&doc, root, &FieldRef::parse("a.b.c.d"))
            .unwrap()
            .unwrap();
        assert_eq!(idx, 2);

        let (idx, e) = find_longest_prefix(&doc, root, &FieldRef::parse("arr.0.x"))
            .unwrap()
            .unwrap();
        assert_eq!(idx, 2);
        assert_eq!(doc.int_value(e).unwrap(), 1);

        assert_eq!(find_longest_prefix(&doc, root, &FieldRef::parse("zzz")).unwrap(), None);
        assert!(find_longest_prefix(&doc, root, &FieldRef::parse("s.x")).is_err());
        assert!(find_longest_prefix(&doc, root, &FieldRef::parse("arr.x")).is_err());
    }
}
