use std::fmt;

/// Marks an absent link in an element record.
pub(crate) const EMPTY_REP: u32 = u32::MAX;

/// Handle to a node of a [`crate::Document`].
///
/// A handle is only an index: copying it never copies node data, and two handles are
/// equal exactly when they name the same slot. Every operation takes the owning
/// document alongside the handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Element(pub(crate) u32);

impl Element {
    pub(crate) fn from_rep(idx: u32) -> Option<Self> {
        (idx != EMPTY_REP).then_some(Self(idx))
    }

    /// Slot index of this handle in its document's element table.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable offset of an entry in a [`crate::Heap`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct HeapRef(pub(crate) usize);

impl HeapRef {
    pub fn offset(self) -> usize {
        self.0
    }
}
