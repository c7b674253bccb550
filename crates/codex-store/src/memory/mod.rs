mod store;
mod transaction;

pub use store::MemoryStore;
pub use transaction::MemoryTransaction;

pub(crate) type Keyspace = imbl::OrdMap<Vec<u8>, Vec<u8>>;
