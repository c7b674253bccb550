use bson::{Bson, Document};
use codex_query::{Lookup, Stage};
use codex_store::Store;

use crate::compare::value_eq;
use crate::database::EngineTransaction;
use crate::error::EngineError;
use crate::matcher::{field_value, matches};
use crate::shape::{project, sort_documents};

/// Run a pipeline over a document sequence, each stage consuming the output
/// of the one before it. All reads — including `$lookup` fetches of foreign
/// collections — go through the surrounding transaction, so a run observes
/// one consistent snapshot.
pub(crate) fn execute<S: Store>(
    txn: &EngineTransaction<'_, S>,
    input: Vec<Document>,
    stages: &[Stage],
) -> Result<Vec<Document>, EngineError> {
    let mut docs = input;
    for stage in stages {
        docs = match stage {
            Stage::Match(predicate) => docs
                .into_iter()
                .filter(|doc| matches(doc, predicate))
                .collect(),
            Stage::Project(projection) => {
                docs.iter().map(|doc| project(doc, projection)).collect()
            }
            Stage::Sort(sort) => {
                sort_documents(&mut docs, sort);
                docs
            }
            Stage::Unwind(field) => unwind(docs, field),
            Stage::Lookup(lookup) => run_lookup(txn, docs, lookup)?,
        };
    }
    Ok(docs)
}

/// Emit one output document per array element, the element replacing the
/// array in place. Documents where the field is absent, empty, or not an
/// array are dropped — no pass-through.
fn unwind(docs: Vec<Document>, field: &str) -> Vec<Document> {
    let mut out = Vec::new();
    for doc in docs {
        let elements = match doc.get(field) {
            Some(Bson::Array(elements)) => elements.clone(),
            _ => continue,
        };
        for element in elements {
            let mut copy = doc.clone();
            copy.insert(field.to_string(), element);
            out.push(copy);
        }
    }
    out
}

/// Left join: attach every foreign document whose `foreign_field` equals the
/// input's `local_field` value as an array under `as_field`. Zero matches
/// attach an empty array — the field is never omitted. A document with no
/// local value joins nothing.
fn run_lookup<S: Store>(
    txn: &EngineTransaction<'_, S>,
    docs: Vec<Document>,
    lookup: &Lookup,
) -> Result<Vec<Document>, EngineError> {
    let foreign = txn.read_all(&lookup.from)?;

    let mut out = Vec::with_capacity(docs.len());
    for mut doc in docs {
        let matched: Vec<Bson> = match field_value(&doc, &lookup.local_field) {
            Some(local) => foreign
                .iter()
                .filter(|fdoc| {
                    field_value(fdoc, &lookup.foreign_field)
                        .is_some_and(|fval| value_eq(fval, local))
                })
                .map(|fdoc| Bson::Document(fdoc.clone()))
                .collect(),
            None => Vec::new(),
        };
        doc.insert(lookup.as_field.clone(), Bson::Array(matched));
        out.push(doc);
    }
    Ok(out)
}
