use std::cmp::Ordering;

use bson::{Bson, Document};
use codex_query::{CmpOp, Predicate};

use crate::compare::{value_cmp, value_eq};

/// Evaluate a predicate against one document. Pure — same inputs, same answer.
///
/// Missing fields never match, with two deliberate exceptions:
/// `$exists: false` and equality against null (which treats "absent" and
/// "explicitly null" alike).
pub fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(children) => children.iter().all(|child| matches(doc, child)),
        Predicate::Or(children) => children.iter().any(|child| matches(doc, child)),
        Predicate::Nor(children) => !children.iter().any(|child| matches(doc, child)),
        Predicate::Eq(field, query) => {
            let value = field_value(doc, field);
            if matches!(query, Bson::Null) {
                return matches!(value, None | Some(Bson::Null));
            }
            match value {
                Some(value) => eq_with_array_elements(value, query),
                None => false,
            }
        }
        Predicate::Cmp(field, op, query) => match field_value(doc, field) {
            Some(Bson::Array(elements)) => elements
                .iter()
                .any(|elem| cmp_matches(elem, *op, query)),
            Some(value) => cmp_matches(value, *op, query),
            None => false,
        },
        Predicate::In(field, options) => match field_value(doc, field) {
            Some(value) => options.iter().any(|opt| eq_with_array_elements(value, opt)),
            None => false,
        },
        Predicate::Type(field, tag) => match field_value(doc, field) {
            Some(value) => tag.matches(value),
            None => false,
        },
        Predicate::Exists(field, expected) => field_value(doc, field).is_some() == *expected,
    }
}

/// Scalar equality, extended so an array field matches when any element does
/// (or when the whole array equals an array-valued query).
fn eq_with_array_elements(value: &Bson, query: &Bson) -> bool {
    if value_eq(value, query) {
        return true;
    }
    match value {
        Bson::Array(elements) => elements.iter().any(|elem| value_eq(elem, query)),
        _ => false,
    }
}

fn cmp_matches(value: &Bson, op: CmpOp, query: &Bson) -> bool {
    let ordering = match value_cmp(value, query) {
        Some(o) => o,
        None => return false,
    };
    match op {
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Gte => ordering != Ordering::Less,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Lte => ordering != Ordering::Greater,
    }
}

/// Look up a (possibly dotted) field path in a document.
pub fn field_value<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;
        if segments.peek().is_none() {
            return Some(value);
        }
        match value {
            Bson::Document(sub) => current = sub,
            _ => return None,
        }
    }
    None
}
