use std::fmt;

use codex_query::ParseError;
use codex_store::StoreError;

use crate::validator::ValidationFailure;

/// Discriminated error taxonomy for every engine operation. No failure path
/// is swallowed; the engine performs no retries of its own.
#[derive(Debug)]
pub enum EngineError {
    /// The underlying store call failed.
    Store(StoreError),
    /// A referenced collection does not exist where existence was assumed.
    CollectionNotFound(String),
    /// The document violates the collection's declared constraints.
    /// The write is rejected with no partial effect.
    Validation(ValidationFailure),
    /// An insert would reuse an existing document identifier.
    DuplicateId(String),
    /// The request itself is malformed (ambiguous projection, bad pipeline,
    /// non-array batch, ...). No store mutation is attempted.
    InvalidRequest(String),
    /// A document could not be encoded or decoded.
    Serialization(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Store(e) => write!(f, "store error: {e}"),
            EngineError::CollectionNotFound(name) => write!(f, "collection not found: {name}"),
            EngineError::Validation(failure) => write!(f, "validation failed: {failure}"),
            EngineError::DuplicateId(id) => write!(f, "duplicate _id: {id}"),
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::Serialization(msg) => write!(f, "serialization error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

impl From<ValidationFailure> for EngineError {
    fn from(failure: ValidationFailure) -> Self {
        EngineError::Validation(failure)
    }
}

impl From<ParseError> for EngineError {
    fn from(e: ParseError) -> Self {
        EngineError::InvalidRequest(e.0)
    }
}
