use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    ReadOnly,
    KeyspaceNotFound(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::ReadOnly => write!(f, "cannot write in a read-only transaction"),
            StoreError::KeyspaceNotFound(name) => write!(f, "keyspace not found: {name}"),
            StoreError::Backend(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
