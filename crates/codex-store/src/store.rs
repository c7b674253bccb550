use crate::error::StoreError;

/// A keyed document store grouped into named keyspaces.
///
/// Every engine request runs inside a [`Transaction`] obtained from
/// [`Store::begin`]. Read transactions observe a consistent snapshot taken at
/// begin time; write transactions additionally serialize against each other
/// and publish their changes atomically on commit.
pub trait Store {
    type Txn<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError>;

    /// Create a keyspace outside of any transaction. Idempotent.
    /// Used for bootstrap (system metadata); collection keyspaces are created
    /// transactionally via [`Transaction::create_keyspace`].
    fn create_keyspace(&self, name: &str) -> Result<(), StoreError>;

    fn drop_keyspace(&self, name: &str) -> Result<(), StoreError>;
}

pub trait Transaction {
    /// Backend-specific keyspace handle. Cheaply cloneable.
    type Ks: Clone;

    /// Resolve a keyspace by name. Must be called before any reads on it.
    fn keyspace(&self, name: &str) -> Result<Self::Ks, StoreError>;

    // Reads
    fn get(&self, ks: &Self::Ks, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Scan all entries whose key starts with `prefix`, in ascending key order.
    fn scan_prefix<'a>(
        &'a self,
        ks: &Self::Ks,
        prefix: &[u8],
    ) -> Result<Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreError>> + 'a>, StoreError>;

    // Writes
    fn put(&self, ks: &Self::Ks, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    fn delete(&self, ks: &Self::Ks, key: &[u8]) -> Result<(), StoreError>;

    // Schema
    fn create_keyspace(&mut self, name: &str) -> Result<(), StoreError>;
    fn drop_keyspace(&mut self, name: &str) -> Result<(), StoreError>;

    // Lifecycle
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}
