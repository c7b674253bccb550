use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use codex_db::{CappedOptions, CollectionSpec, CreateOutcome, Validator};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateCollectionBody {
    validator: Option<Validator>,
    capped: Option<CappedOptions>,
}

pub async fn create(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<CreateCollectionBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    tokio::task::spawn_blocking(move || {
        let spec = CollectionSpec {
            name: name.clone(),
            validator: body.validator,
            capped: body.capped,
        };
        let mut txn = state.db.begin(false)?;
        let outcome = txn.create_collection(&spec)?;
        txn.commit()?;

        match outcome {
            CreateOutcome::Created => Ok((
                StatusCode::CREATED,
                Json(json!({ "ok": true, "message": format!("created collection {name}") })),
            )),
            CreateOutcome::AlreadyExists => Ok((
                StatusCode::OK,
                Json(json!({ "ok": true, "message": format!("collection {name} already exists") })),
            )),
        }
    })
    .await
    .unwrap()
}

#[derive(Deserialize)]
pub struct CreateIndexBody {
    field: String,
}

pub async fn create_index(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<CreateIndexBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    tokio::task::spawn_blocking(move || {
        let mut txn = state.db.begin(false)?;
        let index = txn.create_index(&name, &body.field)?;
        txn.commit()?;
        Ok((
            StatusCode::CREATED,
            Json(json!({ "ok": true, "index": index })),
        ))
    })
    .await
    .unwrap()
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let txn = state.db.begin(true)?;
        let collections = txn.list_collections()?;
        Ok(Json(json!({ "ok": true, "collections": collections })))
    })
    .await
    .unwrap()
}
