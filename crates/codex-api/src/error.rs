use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use codex_db::EngineError;
use codex_query::ParseError;

#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    /// Request body malformed before it ever reached the engine.
    BadRequest(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Engine(e) => match e {
                EngineError::Validation(_)
                | EngineError::DuplicateId(_)
                | EngineError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                EngineError::CollectionNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                EngineError::Store(_) | EngineError::Serialization(_) => {
                    tracing::error!("request failed: {e}");
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
        };

        let body = serde_json::json!({ "ok": false, "error": message });
        (status, Json(body)).into_response()
    }
}
