use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use codex_query::{FindOptions, Predicate, parse_filter, parse_pipeline, parse_projection, parse_sort};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::convert::{document_to_json, json_to_bson, json_to_document};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn insert(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    tokio::task::spawn_blocking(move || {
        let doc = json_to_document(&body)?;
        let mut txn = state.db.begin(false)?;
        let result = txn.insert_one(&name, doc)?;
        txn.commit()?;
        Ok((
            StatusCode::CREATED,
            Json(json!({ "ok": true, "insertedId": result.id })),
        ))
    })
    .await
    .unwrap()
}

pub async fn insert_batch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    tokio::task::spawn_blocking(move || {
        let items = match &body {
            Value::Array(items) if !items.is_empty() => items,
            _ => {
                return Err(ApiError::BadRequest(
                    "batch insert requires a non-empty JSON array".into(),
                ));
            }
        };
        let docs = items
            .iter()
            .map(json_to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut txn = state.db.begin(false)?;
        let result = txn.insert_many(&name, docs)?;
        txn.commit()?;
        Ok((
            StatusCode::CREATED,
            Json(json!({ "ok": true, "insertedCount": result.inserted })),
        ))
    })
    .await
    .unwrap()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct FindBody {
    filter: Option<Value>,
    projection: Option<Value>,
    sort: Option<Value>,
    skip: Option<i64>,
    limit: Option<i64>,
}

pub async fn find(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FindBody>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let predicate = parse_optional_filter(body.filter.as_ref())?;
        let options = find_options(&body)?;

        let txn = state.db.begin(true)?;
        let docs = txn.find(&name, predicate.as_ref(), &options)?;
        Ok(Json(json!({
            "ok": true,
            "docs": docs.iter().map(document_to_json).collect::<Vec<_>>(),
        })))
    })
    .await
    .unwrap()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct FilterBody {
    filter: Option<Value>,
}

pub async fn find_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FilterBody>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let predicate = filter_or_match_all(body.filter.as_ref())?;

        let txn = state.db.begin(true)?;
        let doc = txn.find_one(&name, &predicate)?;
        Ok(Json(json!({
            "ok": true,
            "doc": doc.as_ref().map(document_to_json),
        })))
    })
    .await
    .unwrap()
}

#[derive(Deserialize)]
pub struct UpdateBody {
    filter: Value,
    set: Value,
}

pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let predicate = filter_or_match_all(Some(&body.filter))?;
        let set = json_to_document(&body.set)?;

        let mut txn = state.db.begin(false)?;
        let result = txn.update_one(&name, &predicate, set)?;
        txn.commit()?;
        Ok(Json(json!({
            "ok": true,
            "matchedCount": result.matched,
            "modifiedCount": result.modified,
        })))
    })
    .await
    .unwrap()
}

pub async fn delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FilterBody>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let predicate = filter_or_match_all(body.filter.as_ref())?;

        let mut txn = state.db.begin(false)?;
        let result = txn.delete_many(&name, &predicate)?;
        txn.commit()?;
        Ok(Json(json!({ "ok": true, "deletedCount": result.deleted })))
    })
    .await
    .unwrap()
}

#[derive(Deserialize)]
pub struct AggregateBody {
    pipeline: Vec<Value>,
}

pub async fn aggregate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<AggregateBody>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let stages_bson = body
            .pipeline
            .iter()
            .map(json_to_bson)
            .collect::<Result<Vec<_>, _>>()?;
        let stages = parse_pipeline(&stages_bson)?;

        let txn = state.db.begin(true)?;
        let docs = txn.aggregate(&name, &stages)?;
        Ok(Json(json!({
            "ok": true,
            "docs": docs.iter().map(document_to_json).collect::<Vec<_>>(),
        })))
    })
    .await
    .unwrap()
}

fn parse_optional_filter(filter: Option<&Value>) -> Result<Option<Predicate>, ApiError> {
    match filter {
        Some(value) => {
            let doc = json_to_document(value)?;
            Ok(Some(parse_filter(&doc)?))
        }
        None => Ok(None),
    }
}

/// An absent filter matches everything, same as an empty one.
fn filter_or_match_all(filter: Option<&Value>) -> Result<Predicate, ApiError> {
    match filter {
        Some(value) => {
            let doc = json_to_document(value)?;
            Ok(parse_filter(&doc)?)
        }
        None => Ok(parse_filter(&bson::Document::new())?),
    }
}

fn find_options(body: &FindBody) -> Result<FindOptions, ApiError> {
    let projection = match &body.projection {
        Some(value) => Some(parse_projection(&json_to_document(value)?)?),
        None => None,
    };
    let sort = match &body.sort {
        Some(value) => Some(parse_sort(&json_to_document(value)?)?),
        None => None,
    };
    Ok(FindOptions {
        projection,
        sort,
        skip: positive(body.skip),
        limit: positive(body.limit),
    })
}

/// Non-positive skip/limit values are a no-op rather than an error.
fn positive(value: Option<i64>) -> Option<usize> {
    value.and_then(|v| if v > 0 { Some(v as usize) } else { None })
}
