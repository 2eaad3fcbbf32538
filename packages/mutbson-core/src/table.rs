use crate::ids::{HeapRef, EMPTY_REP};
use crate::types::{BsonType, ObjectId, Timestamp};

/// Strings shorter than this many bytes are stored inside the element record.
pub const SHORT_STRING_LIMIT: usize = 16;

/// Scalar payload of an element record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ValueRep {
    /// Objects, arrays, null and the min/max keys.
    Empty,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Date(i64),
    Timestamp(Timestamp),
    ObjectId(ObjectId),
    Inline {
        len: u8,
        bytes: [u8; SHORT_STRING_LIMIT],
    },
    Heap(HeapRef),
    Regex {
        pattern: HeapRef,
        flags: HeapRef,
    },
    Binary {
        subtype: u8,
        data: HeapRef,
    },
    DbRef {
        ns: HeapRef,
        id: ObjectId,
    },
}

impl ValueRep {
    /// Inline form of `s`, if it is short enough.
    pub(crate) fn inline_str(s: &str) -> Option<Self> {
        let src = s.as_bytes();
        if src.len() >= SHORT_STRING_LIMIT {
            return None;
        }
        let mut bytes = [0u8; SHORT_STRING_LIMIT];
        bytes[..src.len()].copy_from_slice(src);
        Some(ValueRep::Inline {
            len: src.len() as u8,
            bytes,
        })
    }
}

/// One node of the tree. Links hold slot indices or [`EMPTY_REP`].
#[derive(Clone, Debug)]
pub(crate) struct ElementRep {
    pub kind: BsonType,
    pub name: HeapRef,
    pub parent: u32,
    pub left_child: u32,
    pub right_child: u32,
    pub left_sibling: u32,
    pub right_sibling: u32,
    pub value: ValueRep,
}

impl ElementRep {
    pub(crate) fn new(kind: BsonType, name: HeapRef, value: ValueRep) -> Self {
        Self {
            kind,
            name,
            parent: EMPTY_REP,
            left_child: EMPTY_REP,
            right_child: EMPTY_REP,
            left_sibling: EMPTY_REP,
            right_sibling: EMPTY_REP,
            value,
        }
    }

    /// Detached from any parent and sibling list.
    pub(crate) fn is_clean(&self) -> bool {
        self.parent == EMPTY_REP && self.left_sibling == EMPTY_REP && self.right_sibling == EMPTY_REP
    }
}

/// Append-only table of element records. Slots are never reused.
#[derive(Clone, Debug, Default)]
pub(crate) struct ElementTable {
    reps: Vec<ElementRep>,
}

impl ElementTable {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            reps: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, rep: ElementRep) -> u32 {
        let idx = self.reps.len() as u32;
        self.reps.push(rep);
        idx
    }

    pub(crate) fn get(&self, idx: u32) -> Option<&ElementRep> {
        self.reps.get(idx as usize)
    }

    pub(crate) fn get_mut(&mut self, idx: u32) -> Option<&mut ElementRep> {
        self.reps.get_mut(idx as usize)
    }

    pub(crate) fn len(&self) -> usize {
        self.reps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_boundary() {
        assert!(ValueRep::inline_str(&"x".repeat(SHORT_STRING_LIMIT - 1)).is_some());
        assert!(ValueRep::inline_str(&"x".repeat(SHORT_STRING_LIMIT)).is_none());
        assert!(ValueRep::inline_str("").is_some());
    }

    #[test]
    fn new_records_are_clean() {
        let mut table = ElementTable::default();
        let idx = table.push(ElementRep::new(BsonType::Null, HeapRef(0), ValueRep::Empty));
        assert_eq!(idx, 0);
        assert!(table.get(idx).map(ElementRep::is_clean).unwrap_or(false));
        assert!(table.get(1).is_none());
    }
}
