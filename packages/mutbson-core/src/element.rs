use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::{Element, EMPTY_REP};
use crate::table::{ElementRep, ValueRep};
use crate::types::BsonType;

/// Navigation.
impl Document {
    fn link(&self, e: Element, pick: impl Fn(&ElementRep) -> u32) -> Option<Element> {
        self.elements.get(e.0).and_then(|rep| Element::from_rep(pick(rep)))
    }

    pub fn parent(&self, e: Element) -> Option<Element> {
        self.link(e, |r| r.parent)
    }

    pub fn left_child(&self, e: Element) -> Option<Element> {
        self.link(e, |r| r.left_child)
    }

    pub fn right_child(&self, e: Element) -> Option<Element> {
        self.link(e, |r| r.right_child)
    }

    pub fn left_sibling(&self, e: Element) -> Option<Element> {
        self.link(e, |r| r.left_sibling)
    }

    pub fn right_sibling(&self, e: Element) -> Option<Element> {
        self.link(e, |r| r.right_sibling)
    }

    /// Whether `e` names a slot of this document.
    pub fn is_valid(&self, e: Element) -> bool {
        self.elements.get(e.0).is_some()
    }

    pub fn is_attached(&self, e: Element) -> bool {
        self.parent(e).is_some()
    }

    pub fn has_children(&self, e: Element) -> bool {
        self.left_child(e).is_some()
    }

    pub fn field_name(&self, e: Element) -> Result<&str> {
        let name = self.rep(e)?.name;
        self.heap_str(name)
    }

    pub fn element_type(&self, e: Element) -> Result<BsonType> {
        Ok(self.rep(e)?.kind)
    }

    /// Whether the string body of `e` lives in the element record instead of the heap.
    pub fn is_inline(&self, e: Element) -> bool {
        matches!(
            self.elements.get(e.0).map(|r| &r.value),
            Some(ValueRep::Inline { .. })
        )
    }
}

/// Structural mutation.
impl Document {
    /// `e` may be linked under `parent`: it is a detached subtree root, not the document
    /// root, and not `parent` or one of its ancestors.
    fn check_attachable(&self, parent: Element, e: Element) -> Result<()> {
        if e == self.root() {
            return Err(Error::IllegalOperation(
                "the document root cannot be attached".into(),
            ));
        }
        if !self.rep(e)?.is_clean() {
            return Err(Error::IllegalOperation(format!(
                "element {e} is not a detached subtree root"
            )));
        }
        if e == parent {
            return Err(Error::IllegalOperation(format!(
                "cannot attach element {e} beneath itself"
            )));
        }
        // a childless subtree cannot contain `parent`
        if self.rep(e)?.left_child == EMPTY_REP {
            return Ok(());
        }
        let mut cur = parent.0;
        let mut hops = 0usize;
        while cur != EMPTY_REP && hops <= self.elements.len() {
            if cur == e.0 {
                return Err(Error::IllegalOperation(format!(
                    "cannot attach element {e} beneath itself"
                )));
            }
            cur = self.rep(Element(cur))?.parent;
            hops += 1;
        }
        Ok(())
    }

    /// Links `e` as the rightmost child of `parent`.
    pub fn add_child(&mut self, parent: Element, e: Element) -> Result<()> {
        let kind = self.rep(parent)?.kind;
        if !kind.is_container() {
            return Err(Error::IllegalOperation(format!(
                "cannot add a child to a {kind:?} element"
            )));
        }
        self.check_attachable(parent, e)?;

        let old_right = self.rep(parent)?.right_child;
        let child = self.rep_mut(e)?;
        child.parent = parent.0;
        child.left_sibling = old_right;
        if old_right != EMPTY_REP {
            self.rep_mut(Element(old_right))?.right_sibling = e.0;
        }
        let p = self.rep_mut(parent)?;
        p.right_child = e.0;
        if p.left_child == EMPTY_REP {
            p.left_child = e.0;
        }
        Ok(())
    }

    pub fn add_sibling_after(&mut self, anchor: Element, e: Element) -> Result<()> {
        let (parent, right) = self.attached_links(anchor, |r| r.right_sibling)?;
        self.check_attachable(parent, e)?;

        let rep = self.rep_mut(e)?;
        rep.parent = parent.0;
        rep.left_sibling = anchor.0;
        rep.right_sibling = right;
        self.rep_mut(anchor)?.right_sibling = e.0;
        if right != EMPTY_REP {
            self.rep_mut(Element(right))?.left_sibling = e.0;
        } else {
            self.rep_mut(parent)?.right_child = e.0;
        }
        Ok(())
    }

    pub fn add_sibling_before(&mut self, anchor: Element, e: Element) -> Result<()> {
        let (parent, left) = self.attached_links(anchor, |r| r.left_sibling)?;
        self.check_attachable(parent, e)?;

        let rep = self.rep_mut(e)?;
        rep.parent = parent.0;
        rep.right_sibling = anchor.0;
        rep.left_sibling = left;
        self.rep_mut(anchor)?.left_sibling = e.0;
        if left != EMPTY_REP {
            self.rep_mut(Element(left))?.right_sibling = e.0;
        } else {
            self.rep_mut(parent)?.left_child = e.0;
        }
        Ok(())
    }

    fn attached_links(
        &self,
        anchor: Element,
        pick: impl Fn(&ElementRep) -> u32,
    ) -> Result<(Element, u32)> {
        let rep = self.rep(anchor)?;
        match Element::from_rep(rep.parent) {
            Some(parent) => Ok((parent, pick(rep))),
            None => Err(Error::IllegalOperation(format!(
                "cannot add a sibling to unattached element {anchor}"
            ))),
        }
    }

    /// Unlinks `e` from its parent. The subtree below `e` stays intact and can be
    /// attached again.
    pub fn remove(&mut self, e: Element) -> Result<()> {
        if e == self.root() {
            return Err(Error::IllegalOperation(
                "cannot remove the document root".into(),
            ));
        }
        let rep = self.rep(e)?;
        let (parent, left, right) = (rep.parent, rep.left_sibling, rep.right_sibling);
        if parent == EMPTY_REP {
            return Err(Error::IllegalOperation(format!(
                "cannot remove unattached element {e}"
            )));
        }

        if left != EMPTY_REP {
            self.rep_mut(Element(left))?.right_sibling = right;
        } else {
            self.rep_mut(Element(parent))?.left_child = right;
        }
        if right != EMPTY_REP {
            self.rep_mut(Element(right))?.left_sibling = left;
        } else {
            self.rep_mut(Element(parent))?.right_child = left;
        }

        let rep = self.rep_mut(e)?;
        rep.parent = EMPTY_REP;
        rep.left_sibling = EMPTY_REP;
        rep.right_sibling = EMPTY_REP;
        Ok(())
    }

    /// Writes `name` to fresh heap storage; the old name bytes are not reclaimed.
    pub fn rename(&mut self, e: Element, name: &str) -> Result<()> {
        self.rep(e)?;
        let name = self.heap.put_str(name);
        self.rep_mut(e)?.name = name;
        Ok(())
    }

    /// `remove` followed by `add_child`.
    ///
    /// Not atomic: when the `add_child` step fails (for instance because
    /// `new_parent` is a scalar or lies inside `e`), `e` is left detached.
    pub fn move_to(&mut self, e: Element, new_parent: Element) -> Result<()> {
        self.remove(e)?;
        self.add_child(new_parent, e)
    }
}

/// Array operations. All of them fail with `IllegalOperation` on non-array elements.
impl Document {
    fn check_array(&self, arr: Element, op: &str) -> Result<&ElementRep> {
        let rep = self.rep(arr)?;
        if rep.kind != BsonType::Array {
            return Err(Error::IllegalOperation(format!(
                "{op} requires an array, got {:?}",
                rep.kind
            )));
        }
        Ok(rep)
    }

    pub fn array_size(&self, arr: Element) -> Result<usize> {
        self.check_array(arr, "array_size")?;
        Ok(self.children(arr).count())
    }

    pub fn peek_front(&self, arr: Element) -> Result<Element> {
        let rep = self.check_array(arr, "peek_front")?;
        Element::from_rep(rep.left_child)
            .ok_or_else(|| Error::EmptyArrayOperation("peek_front on an empty array".into()))
    }

    pub fn peek_back(&self, arr: Element) -> Result<Element> {
        let rep = self.check_array(arr, "peek_back")?;
        Element::from_rep(rep.right_child)
            .ok_or_else(|| Error::EmptyArrayOperation("peek_back on an empty array".into()))
    }

    pub fn push_front(&mut self, arr: Element, e: Element) -> Result<()> {
        let rep = self.check_array(arr, "push_front")?;
        match Element::from_rep(rep.left_child) {
            Some(first) => self.add_sibling_before(first, e),
            None => self.add_child(arr, e),
        }
    }

    pub fn push_back(&mut self, arr: Element, e: Element) -> Result<()> {
        self.check_array(arr, "push_back")?;
        self.add_child(arr, e)
    }

    /// Detaches and returns the first item.
    pub fn pop_front(&mut self, arr: Element) -> Result<Element> {
        let first = self.peek_front(arr)?;
        self.remove(first)?;
        Ok(first)
    }

    /// Detaches and returns the last item.
    pub fn pop_back(&mut self, arr: Element) -> Result<Element> {
        let last = self.peek_back(arr)?;
        self.remove(last)?;
        Ok(last)
    }

    /// Item at `index`, found by walking the sibling list.
    pub fn array_get(&self, arr: Element, index: usize) -> Result<Element> {
        self.check_array(arr, "array_get")?;
        self.children(arr).nth(index).ok_or_else(|| {
            Error::IllegalOperation(format!("array index {index} is out of bounds"))
        })
    }

    /// Overwrites the scalar at `index` with the type and value of scalar `src`. Names
    /// and links of both elements are left alone.
    pub fn array_set(&mut self, arr: Element, index: usize, src: Element) -> Result<()> {
        let dst = self.array_get(arr, index)?;
        let src_rep = self.rep(src)?;
        let (kind, value) = (src_rep.kind, src_rep.value);
        if kind.is_container() {
            return Err(Error::IllegalOperation(format!(
                "array_set needs a scalar source, got {kind:?}"
            )));
        }
        let dst_rep = self.rep_mut(dst)?;
        if dst_rep.kind.is_container() {
            return Err(Error::IllegalOperation(format!(
                "array_set cannot overwrite a {:?} item",
                dst_rep.kind
            )));
        }
        dst_rep.kind = kind;
        dst_rep.value = value;
        Ok(())
    }
}
