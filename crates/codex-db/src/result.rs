use serde::{Deserialize, Serialize};

/// Outcome of a collection creation call. Re-creating an existing collection
/// acknowledges instead of erroring and never touches the stored spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertResult {
    pub id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InsertManyResult {
    pub inserted: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted: u64,
}
