use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::modifier::{log_set, log_unset, ExecInfo, Modifier};
use crate::path::{bind_positional, check_updatable, find_longest_prefix, FieldRef};
use crate::traits::MatchPredicate;

/// `$pull`: removes every item of an array that the predicate matches.
pub struct ModifierPull<P> {
    field: FieldRef,
    predicate: P,
    prepared: Option<PreparedPull>,
    applied: bool,
}

struct PreparedPull {
    field: FieldRef,
    /// The array, when the whole path exists.
    target: Option<Element>,
    to_remove: Vec<Element>,
}

impl<P: MatchPredicate> ModifierPull<P> {
    pub fn init(field_path: &str, predicate: P) -> Result<Self> {
        let field = FieldRef::parse(field_path);
        check_updatable(&field)?;
        Ok(Self {
            field,
            predicate,
            prepared: None,
            applied: false,
        })
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }
}

impl<P: MatchPredicate> Modifier for ModifierPull<P> {
    fn prepare(&mut self, doc: &Document, root: Element, matched_field: &str) -> Result<ExecInfo> {
        let field = bind_positional(&self.field, matched_field)?;
        let mut prepared = PreparedPull {
            field: field.clone(),
            target: None,
            to_remove: Vec::new(),
        };
        if let Some((idx, e)) = find_longest_prefix(doc, root, &field)? {
            if idx + 1 == field.num_parts() {
                if !doc.is_array(e) {
                    return Err(Error::BadValue(
                        "Cannot apply $pull to a non-array value".into(),
                    ));
                }
                for item in doc.children(e) {
                    if self.predicate.matches(&doc.to_value(item)?) {
                        prepared.to_remove.push(item);
                    }
                }
                prepared.target = Some(e);
            }
        }

        let no_op = prepared.to_remove.is_empty();
        self.prepared = Some(prepared);
        self.applied = false;
        Ok(ExecInfo {
            field_ref: Some(field),
            no_op,
            in_place: no_op,
        })
    }

    fn apply(&mut self, doc: &mut Document) -> Result<()> {
        let prepared = self.prepared.as_ref().ok_or_else(|| {
            Error::IllegalOperation("$pull must be prepared before it is applied".into())
        })?;
        if prepared.to_remove.is_empty() {
            return Err(Error::IllegalOperation(
                "$pull was prepared as a no-op and has nothing to apply".into(),
            ));
        }
        if self.applied {
            return Err(Error::IllegalOperation("$pull was already applied".into()));
        }
        for &item in &prepared.to_remove {
            doc.remove(item)?;
        }
        self.applied = true;
        Ok(())
    }

    fn log(&self, doc: &Document, log_doc: &mut Document, log_root: Element) -> Result<()> {
        let prepared = self.prepared.as_ref().ok_or_else(|| {
            Error::IllegalOperation("$pull must be prepared before it is logged".into())
        })?;
        match prepared.target {
            Some(arr) => log_set(doc, arr, log_doc, log_root, &prepared.field),
            None => log_unset(log_doc, log_root, &prepared.field),
        }
    }
}
