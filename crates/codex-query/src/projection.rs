use bson::{Bson, Document};

use crate::error::ParseError;

/// A field selection applied per result document.
///
/// Either inclusion-only or exclusion-only — mixing the two in one
/// projection is ambiguous and rejected at parse time. The `_id` field is
/// exempt from the mixing rule: inclusion projections drop it unless it is
/// listed explicitly, and `"_id": 0` alongside inclusions is accepted as a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

/// Parse a projection document of `{ field: 1|0 }` entries.
pub fn parse_projection(doc: &Document) -> Result<Projection, ParseError> {
    if doc.is_empty() {
        return Err(ParseError("empty projection document".into()));
    }

    let mut included = Vec::new();
    let mut excluded = Vec::new();
    let mut id_included = false;

    for (field, value) in doc.iter() {
        let include = match value {
            Bson::Int32(n) => *n != 0,
            Bson::Int64(n) => *n != 0,
            Bson::Double(n) => *n != 0.0,
            Bson::Boolean(b) => *b,
            _ => {
                return Err(ParseError(format!(
                    "projection value for {field} must be 0 or 1"
                )));
            }
        };

        if field == "_id" {
            // "_id": 0 is always legal; "_id": 1 only matters for inclusions.
            id_included = include;
            continue;
        }

        if include {
            included.push(field.clone());
        } else {
            excluded.push(field.clone());
        }
    }

    match (included.is_empty(), excluded.is_empty()) {
        (false, false) => Err(ParseError(
            "projection cannot mix inclusion and exclusion".into(),
        )),
        (false, true) => {
            let mut fields = included;
            if id_included {
                fields.push("_id".to_string());
            }
            Ok(Projection::Include(fields))
        }
        (true, false) => {
            let mut fields = excluded;
            if !id_included {
                // Only an explicit "_id": 0 excludes the id in exclusion mode.
                if doc.get("_id").is_some() {
                    fields.push("_id".to_string());
                }
            }
            Ok(Projection::Exclude(fields))
        }
        (true, true) => {
            // Only `_id` entries were present.
            if id_included {
                Ok(Projection::Include(vec!["_id".to_string()]))
            } else {
                Ok(Projection::Exclude(vec!["_id".to_string()]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn inclusion_list() {
        let p = parse_projection(&doc! { "title": 1, "author": 1 }).unwrap();
        assert_eq!(
            p,
            Projection::Include(vec!["title".to_string(), "author".to_string()])
        );
    }

    #[test]
    fn inclusion_with_explicit_id() {
        let p = parse_projection(&doc! { "title": 1, "_id": 1 }).unwrap();
        assert_eq!(
            p,
            Projection::Include(vec!["title".to_string(), "_id".to_string()])
        );
    }

    #[test]
    fn exclusion_list() {
        let p = parse_projection(&doc! { "notes": 0, "draft": 0 }).unwrap();
        assert_eq!(
            p,
            Projection::Exclude(vec!["notes".to_string(), "draft".to_string()])
        );
    }

    #[test]
    fn id_zero_alongside_inclusions_is_accepted() {
        let p = parse_projection(&doc! { "_id": 0, "title": 1, "genres": 1 }).unwrap();
        assert_eq!(
            p,
            Projection::Include(vec!["title".to_string(), "genres".to_string()])
        );
    }

    #[test]
    fn mixing_inclusion_and_exclusion_is_rejected() {
        assert!(parse_projection(&doc! { "title": 1, "notes": 0 }).is_err());
    }

    #[test]
    fn empty_projection_is_rejected() {
        assert!(parse_projection(&doc! {}).is_err());
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(parse_projection(&doc! { "title": "yes" }).is_err());
    }
}
