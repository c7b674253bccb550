use std::cmp::Ordering;

use bson::Bson;

/// Equality between a stored value and a query value.
///
/// Numeric values compare by magnitude across Int32/Int64/Double so that a
/// query `{ "year": 2020 }` matches a stored `Int64(2020)` or `Double(2020.0)`
/// — representation only matters to `$type`, not to equality.
pub(crate) fn value_eq(stored: &Bson, query: &Bson) -> bool {
    // Integer pairs compare exactly; f64 only bridges mixed int/double
    // (an Int64 beyond 2^53 must not collide with its neighbor).
    if let (Some(a), Some(b)) = (integer(stored), integer(query)) {
        return a == b;
    }
    match (numeric(stored), numeric(query)) {
        (Some(a), Some(b)) => return a == b,
        (None, None) => {}
        _ => return false,
    }
    match (stored, query) {
        (Bson::String(a), Bson::String(b)) => a == b,
        (Bson::Boolean(a), Bson::Boolean(b)) => a == b,
        (Bson::Null, Bson::Null) => true,
        (Bson::DateTime(a), Bson::DateTime(b)) => a == b,
        (Bson::Array(a), Bson::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| value_eq(x, y))
        }
        (Bson::Document(a), Bson::Document(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && value_eq(va, vb))
        }
        _ => false,
    }
}

/// Ordered comparison between a stored value and a query value.
/// `None` means the two are not comparable (range predicates then exclude
/// the document rather than erroring).
pub(crate) fn value_cmp(stored: &Bson, query: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (integer(stored), integer(query)) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (numeric(stored), numeric(query)) {
        return a.partial_cmp(&b);
    }
    match (stored, query) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order used by sorting. Documents missing the sort field order as the
/// lowest possible value; across types, the rank is
/// missing < null < numbers < strings < booleans < dates < arrays < documents.
pub(crate) fn sort_cmp(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let rank = sort_rank(a).cmp(&sort_rank(b));
            if rank != Ordering::Equal {
                return rank;
            }
            value_cmp(a, b).unwrap_or(Ordering::Equal)
        }
    }
}

fn sort_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null => 0,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
        Bson::String(_) => 2,
        Bson::Boolean(_) => 3,
        Bson::DateTime(_) => 4,
        Bson::Array(_) => 5,
        Bson::Document(_) => 6,
        _ => 7,
    }
}

fn integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(n) => Some(*n as i64),
        Bson::Int64(n) => Some(*n),
        _ => None,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Human-readable type name for error reports. Matches the `$type` tag
/// vocabulary where one exists.
pub(crate) fn type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Int32(_) | Bson::Int64(_) => "int",
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Boolean(_) => "bool",
        Bson::Null => "null",
        Bson::DateTime(_) => "date",
        Bson::Array(_) => "array",
        Bson::Document(_) => "object",
        _ => "unsupported",
    }
}
