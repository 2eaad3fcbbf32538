//! Staged update operators.
//!
//! A modifier is built by its `init` constructor, then driven through
//! [`Modifier::prepare`], [`Modifier::apply`] and [`Modifier::log`]. `prepare` only reads
//! the document: it locates the target, decides whether anything would change, and
//! records that in [`ExecInfo`] so a driver can skip no-ops and reject conflicting
//! modifiers before any mutation happens.

use std::fmt;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::ids::Element;
use crate::path::FieldRef;

/// What `prepare` learned about a modifier's effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecInfo {
    /// Resolved target path, positional part bound.
    pub field_ref: Option<FieldRef>,
    /// `apply` would not change the document.
    pub no_op: bool,
    /// The change keeps the document's size and layout.
    pub in_place: bool,
}

impl ExecInfo {
    pub fn conflicts_with(&self, other: &ExecInfo) -> bool {
        match (&self.field_ref, &other.field_ref) {
            (Some(a), Some(b)) => a.conflicts_with(b),
            _ => false,
        }
    }
}

impl fmt::Display for ExecInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field_ref {
            Some(field) => write!(f, "'{field}'"),
            None => f.write_str("<no field>"),
        }
    }
}

pub trait Modifier {
    /// Locates the target under `root` and classifies the operation. `matched_field`
    /// binds a positional `$` in the path; pass `""` when the query matched no array item.
    fn prepare(&mut self, doc: &Document, root: Element, matched_field: &str) -> Result<ExecInfo>;

    /// Performs the prepared change. Fails unless the last `prepare` found work to do, and
    /// fails when called twice.
    fn apply(&mut self, doc: &mut Document) -> Result<()>;

    /// Appends the oplog form of the change to `log_root` in `log_doc`.
    fn log(&self, doc: &Document, log_doc: &mut Document, log_root: Element) -> Result<()>;
}

/// Runs `mods` against `doc` as one update.
///
/// Every modifier is prepared first; overlapping target paths fail with `BadValue`
/// before anything is applied. No-op modifiers are not applied, but all of them are
/// logged into `log` when one is given.
pub fn apply_modifiers(
    doc: &mut Document,
    mods: &mut [&mut dyn Modifier],
    matched_field: &str,
    log: Option<&mut Document>,
) -> Result<Vec<ExecInfo>> {
    let root = doc.root();
    let mut infos = Vec::with_capacity(mods.len());
    for m in mods.iter_mut() {
        infos.push(m.prepare(doc, root, matched_field)?);
    }
    for (i, a) in infos.iter().enumerate() {
        if let Some(b) = infos[i + 1..].iter().find(|b| a.conflicts_with(b)) {
            return Err(Error::BadValue(format!(
                "conflicting modifiers at {a} and {b}"
            )));
        }
    }
    for (m, info) in mods.iter_mut().zip(&infos) {
        if !info.no_op {
            m.apply(doc)?;
        }
    }
    if let Some(log_doc) = log {
        let log_root = log_doc.root();
        for m in mods.iter() {
            m.log(doc, log_doc, log_root)?;
        }
    }
    Ok(infos)
}

/// Returns the `section` object (`$set`, `$unset`) under `log_root`, creating it.
fn log_section(log_doc: &mut Document, log_root: Element, section: &str) -> Result<Element> {
    let existing = log_doc
        .children(log_root)
        .find(|&c| log_doc.field_name(c).map(|n| n == section).unwrap_or(false));
    match existing {
        Some(e) => Ok(e),
        None => log_doc.append_object(log_root, section),
    }
}

fn log_failure(e: Error) -> Error {
    match e {
        Error::InternalError(_) => e,
        other => Error::InternalError(format!("could not write log entry: {other}")),
    }
}

/// `{ $set: { <field>: <copy of arr> } }`.
pub(crate) fn log_set(
    doc: &Document,
    value: Element,
    log_doc: &mut Document,
    log_root: Element,
    field: &FieldRef,
) -> Result<()> {
    let write = |log_doc: &mut Document| -> Result<()> {
        let section = log_section(log_doc, log_root, "$set")?;
        let copy = log_doc.copy_from(doc, value, &field.dotted())?;
        log_doc.add_child(section, copy)
    };
    write(log_doc).map_err(log_failure)
}

/// `{ $unset: { <field>: 1 } }`.
pub(crate) fn log_unset(log_doc: &mut Document, log_root: Element, field: &FieldRef) -> Result<()> {
    let write = |log_doc: &mut Document| -> Result<()> {
        let section = log_section(log_doc, log_root, "$unset")?;
        log_doc.append_int(section, &field.dotted(), 1)?;
        Ok(())
    };
    write(log_doc).map_err(log_failure)
}
