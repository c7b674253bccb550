use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::MutexGuard;

use crate::error::StoreError;
use crate::store::Transaction;

use super::Keyspace;
use super::store::MemoryStore;

/// Keyspace handle for the memory backend — a name token. All reads go
/// through the transaction's snapshot so writes within the same transaction
/// are visible to subsequent reads.
#[derive(Clone)]
pub struct MemoryKs {
    name: String,
}

/// Lazily-populated transaction state. Keyspaces are snapshotted on first
/// touch and mutated locally; `commit` publishes the dirty ones back.
struct TxnState {
    snapshot: HashMap<String, Keyspace>,
    dirty: HashSet<String>,
    dropped: HashSet<String>,
}

impl TxnState {
    fn new() -> Self {
        Self {
            snapshot: HashMap::new(),
            dirty: HashSet::new(),
            dropped: HashSet::new(),
        }
    }

    fn ensure(&mut self, store: &MemoryStore, name: &str) -> Result<(), StoreError> {
        if self.snapshot.contains_key(name) {
            return Ok(());
        }
        if self.dropped.contains(name) {
            return Err(StoreError::KeyspaceNotFound(name.to_string()));
        }
        match store.load(name) {
            Some(data) => {
                self.snapshot.insert(name.to_string(), data);
                Ok(())
            }
            None => Err(StoreError::KeyspaceNotFound(name.to_string())),
        }
    }

    fn keyspace(&self, name: &str) -> Result<&Keyspace, StoreError> {
        self.snapshot
            .get(name)
            .ok_or_else(|| StoreError::KeyspaceNotFound(name.to_string()))
    }

    fn keyspace_mut(&mut self, name: &str) -> Result<&mut Keyspace, StoreError> {
        self.snapshot
            .get_mut(name)
            .ok_or_else(|| StoreError::KeyspaceNotFound(name.to_string()))
    }
}

pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    state: RefCell<TxnState>,
    read_only: bool,
    /// Held for the duration of a write transaction.
    _write_guard: Option<MutexGuard<'a, ()>>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new_read_only(store: &'a MemoryStore) -> Self {
        Self {
            store,
            state: RefCell::new(TxnState::new()),
            read_only: true,
            _write_guard: None,
        }
    }

    pub(crate) fn new_writable(store: &'a MemoryStore, guard: MutexGuard<'a, ()>) -> Self {
        Self {
            store,
            state: RefCell::new(TxnState::new()),
            read_only: false,
            _write_guard: Some(guard),
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl<'a> Transaction for MemoryTransaction<'a> {
    type Ks = MemoryKs;

    fn keyspace(&self, name: &str) -> Result<Self::Ks, StoreError> {
        let mut state = self.state.borrow_mut();
        state.ensure(self.store, name)?;
        Ok(MemoryKs {
            name: name.to_string(),
        })
    }

    fn get(&self, ks: &Self::Ks, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let state = self.state.borrow();
        let data = state.keyspace(&ks.name)?;
        Ok(data.get(key).cloned())
    }

    fn scan_prefix<'b>(
        &'b self,
        ks: &Self::Ks,
        prefix: &[u8],
    ) -> Result<Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), StoreError>> + 'b>, StoreError>
    {
        let state = self.state.borrow();
        let data = state.keyspace(&ks.name)?;

        // Materialize the matching range — snapshots are in-memory, and this
        // avoids holding the RefCell borrow inside the returned iterator.
        let entries: Vec<(Vec<u8>, Vec<u8>)> = match prefix_end(prefix) {
            Some(end) => data
                .range(prefix.to_vec()..end)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => data
                .range(prefix.to_vec()..)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn put(&self, ks: &Self::Ks, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.borrow_mut();
        state.keyspace_mut(&ks.name)?.insert(key.to_vec(), value.to_vec());
        state.dirty.insert(ks.name.clone());
        Ok(())
    }

    fn delete(&self, ks: &Self::Ks, key: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.borrow_mut();
        state.keyspace_mut(&ks.name)?.remove(key);
        state.dirty.insert(ks.name.clone());
        Ok(())
    }

    fn create_keyspace(&mut self, name: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.borrow_mut();
        // A name dropped earlier in this transaction starts over empty; its
        // committed data must not reload behind the drop.
        let was_dropped = state.dropped.remove(name);
        if was_dropped || (!state.snapshot.contains_key(name) && self.store.load(name).is_none()) {
            state.snapshot.insert(name.to_string(), Keyspace::new());
            state.dirty.insert(name.to_string());
        } else {
            state.ensure(self.store, name)?;
        }
        Ok(())
    }

    fn drop_keyspace(&mut self, name: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut state = self.state.borrow_mut();
        state.snapshot.remove(name);
        state.dirty.remove(name);
        state.dropped.insert(name.to_string());
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        if self.read_only {
            return Ok(());
        }
        let mut state = self.state.into_inner();
        let dirty: Vec<(String, Keyspace)> = state
            .dirty
            .iter()
            .filter_map(|name| state.snapshot.remove(name).map(|data| (name.clone(), data)))
            .collect();
        let dropped: Vec<String> = state.dropped.into_iter().collect();
        self.store.publish(dirty, dropped)
    }

    fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Exclusive upper bound for a prefix scan: the prefix with its last
/// non-0xff byte incremented. `None` means the range is unbounded above.
fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return Some(end);
        }
        end.pop();
    }
    None
}
