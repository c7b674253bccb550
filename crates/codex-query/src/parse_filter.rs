use bson::{Bson, Document};

use crate::error::ParseError;
use crate::predicate::{CmpOp, Predicate, TypeTag};

/// Parse a filter document into a [`Predicate`] tree.
///
/// Follows MongoDB query conventions:
/// - The top-level document is an implicit AND of all entries; an empty
///   document matches everything.
/// - `{ "field": value }` is implicit `$eq`.
/// - `{ "field": { "$gte": v1, "$lte": v2 } }` uses operator sub-documents;
///   multiple operators on one field AND together.
/// - `{ "$and": [...] }` / `{ "$or": [...] }` / `{ "$nor": [...] }` for
///   explicit combinators.
/// - `{ "field": { "$in": [...] } }` for set membership.
/// - `{ "field": { "$type": "int" } }` for stored-representation checks.
/// - `{ "field": { "$exists": bool } }` for presence checks.
pub fn parse_filter(doc: &Document) -> Result<Predicate, ParseError> {
    let mut children = Vec::new();

    for (key, value) in doc.iter() {
        match key.as_str() {
            "$and" => children.push(parse_combinator(value, Predicate::And, "$and")?),
            "$or" => children.push(parse_combinator(value, Predicate::Or, "$or")?),
            "$nor" => children.push(parse_combinator(value, Predicate::Nor, "$nor")?),
            k if k.starts_with('$') => {
                return Err(ParseError(format!("unknown top-level operator: {k}")));
            }
            field => children.push(parse_field_condition(field, value)?),
        }
    }

    if children.len() == 1 {
        Ok(children.pop().unwrap())
    } else {
        Ok(Predicate::And(children))
    }
}

/// Parse a `$and` / `$or` / `$nor` array into a combinator node.
fn parse_combinator(
    value: &Bson,
    make: fn(Vec<Predicate>) -> Predicate,
    op: &str,
) -> Result<Predicate, ParseError> {
    let arr = match value {
        Bson::Array(a) => a,
        _ => return Err(ParseError(format!("{op} value must be an array"))),
    };
    if arr.is_empty() {
        return Err(ParseError(format!("{op} array must not be empty")));
    }

    let mut children = Vec::with_capacity(arr.len());
    for elem in arr {
        match elem {
            Bson::Document(sub) => children.push(parse_filter(sub)?),
            _ => {
                return Err(ParseError(format!("{op} array elements must be documents")));
            }
        }
    }
    Ok(make(children))
}

/// Parse a field condition: implicit `$eq` or an operator sub-document.
fn parse_field_condition(field: &str, value: &Bson) -> Result<Predicate, ParseError> {
    if let Bson::Document(sub) = value {
        if sub.keys().any(|k| k.starts_with('$')) {
            return parse_operator_doc(field, sub);
        }
    }
    Ok(Predicate::Eq(field.to_string(), value.clone()))
}

/// Parse an operator sub-document like `{ "$gte": 2000, "$lte": 2020 }`.
fn parse_operator_doc(field: &str, doc: &Document) -> Result<Predicate, ParseError> {
    let mut conditions = Vec::new();

    for (op, value) in doc.iter() {
        let field = field.to_string();
        let condition = match op.as_str() {
            "$eq" => Predicate::Eq(field, value.clone()),
            "$gt" => Predicate::Cmp(field, CmpOp::Gt, value.clone()),
            "$gte" => Predicate::Cmp(field, CmpOp::Gte, value.clone()),
            "$lt" => Predicate::Cmp(field, CmpOp::Lt, value.clone()),
            "$lte" => Predicate::Cmp(field, CmpOp::Lte, value.clone()),
            "$in" => match value {
                Bson::Array(values) => Predicate::In(field, values.clone()),
                _ => return Err(ParseError("$in value must be an array".into())),
            },
            "$type" => match value {
                Bson::String(name) => match TypeTag::from_name(name) {
                    Some(tag) => Predicate::Type(field, tag),
                    None => return Err(ParseError(format!("unknown type tag: {name}"))),
                },
                _ => return Err(ParseError("$type value must be a string".into())),
            },
            "$exists" => match value {
                Bson::Boolean(b) => Predicate::Exists(field, *b),
                _ => return Err(ParseError("$exists value must be a boolean".into())),
            },
            k => return Err(ParseError(format!("unknown field operator: {k}"))),
        };
        conditions.push(condition);
    }

    match conditions.len() {
        0 => Err(ParseError("empty operator document".into())),
        1 => Ok(conditions.pop().unwrap()),
        _ => Ok(Predicate::And(conditions)),
    }
}
