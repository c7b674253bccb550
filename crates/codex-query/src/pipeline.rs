use bson::{Bson, Document};

use crate::error::ParseError;
use crate::find::{Sort, parse_sort};
use crate::parse_filter::parse_filter;
use crate::predicate::Predicate;
use crate::projection::{Projection, parse_projection};

/// One aggregation stage. A pipeline is an ordered `Vec<Stage>`, immutable
/// once submitted; each stage consumes the previous stage's output.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Predicate),
    Project(Projection),
    Sort(Sort),
    /// Replace an array field with one element per output document.
    Unwind(String),
    /// Left join against another collection, attaching matches as an array.
    Lookup(Lookup),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

/// Parse an aggregation pipeline from an array of single-key stage documents.
pub fn parse_pipeline(stages: &[Bson]) -> Result<Vec<Stage>, ParseError> {
    stages.iter().map(parse_stage).collect()
}

fn parse_stage(stage: &Bson) -> Result<Stage, ParseError> {
    let doc = match stage {
        Bson::Document(d) => d,
        _ => return Err(ParseError("pipeline stage must be a document".into())),
    };

    let mut entries = doc.iter();
    let (name, value) = entries
        .next()
        .ok_or_else(|| ParseError("empty pipeline stage".into()))?;
    if entries.next().is_some() {
        return Err(ParseError(format!(
            "pipeline stage must have exactly one key, near {name}"
        )));
    }

    match name.as_str() {
        "$match" => match value {
            Bson::Document(filter) => Ok(Stage::Match(parse_filter(filter)?)),
            _ => Err(ParseError("$match value must be a document".into())),
        },
        "$project" => match value {
            Bson::Document(projection) => Ok(Stage::Project(parse_projection(projection)?)),
            _ => Err(ParseError("$project value must be a document".into())),
        },
        "$sort" => match value {
            Bson::Document(sort) => Ok(Stage::Sort(parse_sort(sort)?)),
            _ => Err(ParseError("$sort value must be a document".into())),
        },
        "$unwind" => match value {
            // Accepts "$genres" (field-path form) or "genres".
            Bson::String(path) => {
                let field = path.strip_prefix('$').unwrap_or(path);
                if field.is_empty() {
                    return Err(ParseError("$unwind field must not be empty".into()));
                }
                Ok(Stage::Unwind(field.to_string()))
            }
            _ => Err(ParseError("$unwind value must be a field path".into())),
        },
        "$lookup" => match value {
            Bson::Document(spec) => Ok(Stage::Lookup(parse_lookup(spec)?)),
            _ => Err(ParseError("$lookup value must be a document".into())),
        },
        other => Err(ParseError(format!("unknown pipeline stage: {other}"))),
    }
}

fn parse_lookup(spec: &Document) -> Result<Lookup, ParseError> {
    let get = |key: &str| -> Result<String, ParseError> {
        match spec.get(key) {
            Some(Bson::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(ParseError(format!("$lookup requires a string {key}"))),
        }
    };
    Ok(Lookup {
        from: get("from")?,
        local_field: get("localField")?,
        foreign_field: get("foreignField")?,
        as_field: get("as")?,
    })
}
