use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use arc_swap::ArcSwap;

use crate::error::StoreError;
use crate::store::Store;

use super::Keyspace;
use super::transaction::MemoryTransaction;

/// In-memory snapshot-isolated store.
///
/// Each keyspace is a persistent ordered map behind an [`ArcSwap`]. Readers
/// clone the current map (cheap — structural sharing), writers serialize on a
/// store-wide lock and publish their modified keyspaces atomically on commit.
pub struct MemoryStore {
    keyspaces: RwLock<HashMap<String, Arc<ArcSwap<Keyspace>>>>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            keyspaces: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot a single keyspace, or `None` if it doesn't exist.
    pub(crate) fn load(&self, name: &str) -> Option<Keyspace> {
        let keyspaces = self.keyspaces.read().unwrap();
        keyspaces.get(name).map(|arc| (**arc.load()).clone())
    }

    /// Publish the outcome of a write transaction. Called with the write lock
    /// still held, so no other writer can interleave.
    pub(crate) fn publish(
        &self,
        dirty: Vec<(String, Keyspace)>,
        dropped: Vec<String>,
    ) -> Result<(), StoreError> {
        let mut keyspaces = self.keyspaces.write().unwrap();
        for name in dropped {
            keyspaces.remove(&name);
        }
        for (name, data) in dirty {
            keyspaces
                .entry(name)
                .or_insert_with(|| Arc::new(ArcSwap::new(Arc::new(Keyspace::new()))))
                .store(Arc::new(data));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    type Txn<'a> = MemoryTransaction<'a>;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError> {
        if read_only {
            return Ok(MemoryTransaction::new_read_only(self));
        }
        let guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Backend(format!("write lock poisoned: {e}")))?;
        Ok(MemoryTransaction::new_writable(self, guard))
    }

    fn create_keyspace(&self, name: &str) -> Result<(), StoreError> {
        let mut keyspaces = self.keyspaces.write().unwrap();
        keyspaces
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(ArcSwap::new(Arc::new(Keyspace::new()))));
        Ok(())
    }

    fn drop_keyspace(&self, name: &str) -> Result<(), StoreError> {
        let mut keyspaces = self.keyspaces.write().unwrap();
        keyspaces.remove(name);
        Ok(())
    }
}
