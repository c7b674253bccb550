use bson::Document;
use codex_query::{FindOptions, Projection, Sort, SortDirection};

use crate::compare::sort_cmp;
use crate::matcher::field_value;

/// Apply sort, skip, limit, and projection to a result sequence, in that
/// order. With no options set this is the identity.
pub fn shape(mut docs: Vec<Document>, options: &FindOptions) -> Vec<Document> {
    if let Some(sort) = &options.sort {
        sort_documents(&mut docs, sort);
    }

    let skip = options.skip.unwrap_or(0);
    let docs: Vec<Document> = match options.limit {
        Some(limit) => docs.into_iter().skip(skip).take(limit).collect(),
        None => docs.into_iter().skip(skip).collect(),
    };

    match &options.projection {
        Some(projection) => docs.iter().map(|doc| project(doc, projection)).collect(),
        None => docs,
    }
}

/// Stable sort by a single field. Documents missing the field sort as the
/// lowest possible value, so they come first ascending and last descending.
pub(crate) fn sort_documents(docs: &mut [Document], sort: &Sort) {
    docs.sort_by(|a, b| {
        let ordering = sort_cmp(field_value(a, &sort.field), field_value(b, &sort.field));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Shape one document through a projection. Inclusion preserves the source
/// field order and drops `_id` unless it was listed explicitly.
pub(crate) fn project(doc: &Document, projection: &Projection) -> Document {
    let mut out = Document::new();
    match projection {
        Projection::Include(fields) => {
            for (key, value) in doc.iter() {
                if fields.iter().any(|f| f == key) {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        Projection::Exclude(fields) => {
            for (key, value) in doc.iter() {
                if !fields.iter().any(|f| f == key) {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
    }
    out
}
