use crate::document::Document;
use crate::ids::{Element, EMPTY_REP};
use crate::traits::Filter;

/// Pre-order walk of the subtree rooted at its origin, origin first.
///
/// The walk never steps to the origin's own siblings or ancestors. Each step climbs at
/// most `depth_limit` parents while looking for the next sibling.
pub struct SubtreeIter<'a> {
    doc: &'a Document,
    origin: u32,
    next: u32,
}

impl<'a> SubtreeIter<'a> {
    pub(crate) fn new(doc: &'a Document, origin: Element) -> Self {
        let next = if doc.is_valid(origin) { origin.0 } else { EMPTY_REP };
        Self {
            doc,
            origin: origin.0,
            next,
        }
    }

    pub fn done(&self) -> bool {
        self.next == EMPTY_REP
    }

    fn successor(&self, cur: u32) -> u32 {
        let Some(rep) = self.doc.elements.get(cur) else {
            return EMPTY_REP;
        };
        if rep.kind.is_container() && rep.left_child != EMPTY_REP {
            return rep.left_child;
        }
        if cur == self.origin {
            return EMPTY_REP;
        }
        if rep.right_sibling != EMPTY_REP {
            return rep.right_sibling;
        }
        let limit = self.doc.options().depth_limit;
        let mut at = rep.parent;
        let mut hops = 0;
        while at != EMPTY_REP && at != self.origin && hops < limit {
            let Some(up) = self.doc.elements.get(at) else {
                return EMPTY_REP;
            };
            if up.right_sibling != EMPTY_REP {
                return up.right_sibling;
            }
            at = up.parent;
            hops += 1;
        }
        EMPTY_REP
    }
}

impl Iterator for SubtreeIter<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        let cur = Element::from_rep(self.next)?;
        self.next = self.successor(cur.0);
        Some(cur)
    }
}

/// Walks right along a sibling list.
pub struct SiblingIter<'a> {
    doc: &'a Document,
    next: Option<Element>,
}

impl SiblingIter<'_> {
    pub fn done(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for SiblingIter<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        let cur = self.next?;
        self.next = self.doc.right_sibling(cur);
        Some(cur)
    }
}

/// Descendants of an origin accepted by a [`Filter`], in pre-order.
///
/// The origin itself is never tested. The iterator keeps the next match ready, so
/// [`FilterIter::done`] is exact.
pub struct FilterIter<'a, F> {
    doc: &'a Document,
    inner: SubtreeIter<'a>,
    filter: F,
    pending: Option<Element>,
}

impl<'a, F: Filter> FilterIter<'a, F> {
    pub fn new(doc: &'a Document, origin: Element, filter: F) -> Self {
        let mut inner = SubtreeIter::new(doc, origin);
        inner.next();
        let mut iter = Self {
            doc,
            inner,
            filter,
            pending: None,
        };
        iter.pending = iter.advance();
        iter
    }

    pub fn done(&self) -> bool {
        self.pending.is_none()
    }

    fn advance(&mut self) -> Option<Element> {
        let doc = self.doc;
        let filter = &self.filter;
        self.inner.find(|&e| filter.matches(doc, e))
    }
}

impl<F: Filter> Iterator for FilterIter<'_, F> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        let cur = self.pending?;
        self.pending = self.advance();
        Some(cur)
    }
}

/// Exact field-name match.
#[derive(Clone, Debug)]
pub struct FieldNameFilter {
    name: String,
}

impl FieldNameFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Filter for FieldNameFilter {
    fn matches(&self, doc: &Document, e: Element) -> bool {
        doc.field_name(e).map(|n| n == self.name).unwrap_or(false)
    }
}

impl Document {
    /// Pre-order traversal of `e` and everything below it.
    pub fn subtree(&self, e: Element) -> SubtreeIter<'_> {
        SubtreeIter::new(self, e)
    }

    /// Direct children of `e`, left to right.
    pub fn children(&self, e: Element) -> SiblingIter<'_> {
        SiblingIter {
            doc: self,
            next: self.left_child(e),
        }
    }

    /// `e` and its right siblings.
    pub fn siblings_from(&self, e: Element) -> SiblingIter<'_> {
        SiblingIter {
            doc: self,
            next: self.is_valid(e).then_some(e),
        }
    }

    /// Descendants of `e` named exactly `name`.
    pub fn find(&self, e: Element, name: &str) -> FilterIter<'_, FieldNameFilter> {
        FilterIter::new(self, e, FieldNameFilter::new(name))
    }

    pub fn filter<F: Filter>(&self, e: Element, filter: F) -> FilterIter<'_, F> {
        FilterIter::new(self, e, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentOptions;
    use crate::value::Value;

    fn names(doc: &Document, it: impl Iterator<Item = Element>) -> Vec<String> {
        it.map(|e| doc.field_name(e).unwrap().to_owned()).collect()
    }

    #[test]
    fn subtree_is_preorder_and_confined() {
        let doc = Document::from_value(&Value::doc([
            ("a", Value::doc([("b", Value::from(1)), ("c", Value::doc([("d", 2)]))])),
            ("e", Value::from(3)),
        ]))
        .unwrap();
        let root = doc.root();
        assert_eq!(names(&doc, doc.subtree(root)), ["", "a", "b", "c", "d", "e"]);

        let a = doc.left_child(root).unwrap();
        assert_eq!(names(&doc, doc.subtree(a)), ["a", "b", "c", "d"]);

        let e = doc.right_child(root).unwrap();
        let mut it = doc.subtree(e);
        assert!(!it.done());
        assert_eq!(it.next(), Some(e));
        assert!(it.done());
    }

    #[test]
    fn depth_limit_stops_ascent() {
        let mut doc = Document::with_options(DocumentOptions::new().with_depth_limit(1));
        let root = doc.root();
        let a = doc.append_object(root, "a").unwrap();
        let b = doc.append_object(a, "b").unwrap();
        doc.append_int(b, "c", 1).unwrap();
        doc.append_int(root, "z", 2).unwrap();
        // from c, reaching z takes two parent hops
        assert_eq!(names(&doc, doc.subtree(root)), ["", "a", "b", "c"]);
    }

    #[test]
    fn find_skips_origin_and_terminates() {
        let doc = Document::from_value(&Value::doc([
            ("x", Value::doc([("x", Value::from(1))])),
            ("y", Value::doc([("x", Value::from(2))])),
        ]))
        .unwrap();
        let root = doc.root();
        let found: Vec<_> = doc.find(root, "x").collect();
        assert_eq!(found.len(), 3);

        let outer = doc.left_child(root).unwrap();
        let mut it = doc.find(outer, "x");
        assert_eq!(it.next(), doc.left_child(outer));
        assert!(it.done());
        assert_eq!(it.next(), None);

        assert!(doc.find(root, "missing").done());
    }

    #[test]
    fn children_and_siblings() {
        let doc = Document::from_value(&Value::doc([("a", 1), ("b", 2), ("c", 3)])).unwrap();
        let root = doc.root();
        assert_eq!(names(&doc, doc.children(root)), ["a", "b", "c"]);
        let b = doc.children(root).nth(1).unwrap();
        assert_eq!(names(&doc, doc.siblings_from(b)), ["b", "c"]);
    }
}
