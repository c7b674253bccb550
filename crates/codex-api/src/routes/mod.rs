mod collections;
mod documents;
mod health;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/collections", get(collections::list))
        .route("/collections/{name}", post(collections::create))
        .route("/collections/{name}/indexes", post(collections::create_index))
        .route(
            "/collections/{name}/documents",
            post(documents::insert)
                .patch(documents::update)
                .delete(documents::delete),
        )
        .route(
            "/collections/{name}/documents/batch",
            post(documents::insert_batch),
        )
        .route("/collections/{name}/find", post(documents::find))
        .route("/collections/{name}/find-one", post(documents::find_one))
        .route("/collections/{name}/aggregate", post(documents::aggregate))
}
