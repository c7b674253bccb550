use bson::{Bson, Document};

use crate::error::ParseError;
use crate::projection::Projection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Single-field sort specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Result-shaping options for a find: projection, sort, skip, limit.
///
/// Skip and limit are applied after the sort; absent means no-op (the
/// transport layer maps non-positive client values to `None`).
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub projection: Option<Projection>,
    pub sort: Option<Sort>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Parse a sort document of exactly one `{ field: 1|-1 }` entry.
pub fn parse_sort(doc: &Document) -> Result<Sort, ParseError> {
    let mut entries = doc.iter();
    let (field, value) = entries
        .next()
        .ok_or_else(|| ParseError("empty sort document".into()))?;
    if entries.next().is_some() {
        return Err(ParseError("sort must name exactly one field".into()));
    }

    let direction = match value {
        Bson::Int32(1) | Bson::Int64(1) => SortDirection::Asc,
        Bson::Int32(-1) | Bson::Int64(-1) => SortDirection::Desc,
        _ => {
            return Err(ParseError(format!(
                "sort direction for {field} must be 1 or -1"
            )));
        }
    };

    Ok(Sort {
        field: field.clone(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn parses_ascending_and_descending() {
        assert_eq!(
            parse_sort(&doc! { "year": 1 }).unwrap(),
            Sort {
                field: "year".into(),
                direction: SortDirection::Asc
            }
        );
        assert_eq!(
            parse_sort(&doc! { "year": -1 }).unwrap(),
            Sort {
                field: "year".into(),
                direction: SortDirection::Desc
            }
        );
    }

    #[test]
    fn rejects_multi_field_and_bad_direction() {
        assert!(parse_sort(&doc! {}).is_err());
        assert!(parse_sort(&doc! { "year": -1, "title": 1 }).is_err());
        assert!(parse_sort(&doc! { "year": "desc" }).is_err());
    }
}
