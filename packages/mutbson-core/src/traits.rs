use crate::document::Document;
use crate::ids::Element;
use crate::value::Value;

/// Element test used by filtered traversal.
pub trait Filter {
    fn matches(&self, doc: &Document, e: Element) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Document, Element) -> bool,
{
    fn matches(&self, doc: &Document, e: Element) -> bool {
        self(doc, e)
    }
}

/// Query-side predicate consulted by `$pull`. Evaluation lives with the caller; this
/// crate only asks whether an array item matches.
pub trait MatchPredicate {
    fn matches(&self, value: &Value) -> bool;
}

impl<F> MatchPredicate for F
where
    F: Fn(&Value) -> bool,
{
    fn matches(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Matches items equal to a fixed value, comparing numbers across widths.
#[derive(Clone, Debug)]
pub struct EqualsValue(pub Value);

impl MatchPredicate for EqualsValue {
    fn matches(&self, value: &Value) -> bool {
        crate::compare::compare_values(&self.0, value).is_eq()
    }
}
