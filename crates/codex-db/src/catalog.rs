use codex_store::Transaction;

use crate::collection::CollectionSpec;
use crate::error::EngineError;
use crate::keys;
use crate::result::CreateOutcome;

/// Collection metadata stored in the `_sys` keyspace: specs, index markers,
/// and the per-collection sequence and size counters.
pub(crate) struct Catalog;

impl Catalog {
    // ── Collections ─────────────────────────────────────────────

    /// `Absent → Created` on the first call; later calls acknowledge with
    /// `AlreadyExists` and leave the stored spec untouched.
    pub(crate) fn create_collection<T: Transaction>(
        &self,
        txn: &mut T,
        spec: &CollectionSpec,
    ) -> Result<CreateOutcome, EngineError> {
        if spec.name == keys::SYS_KS {
            return Err(EngineError::InvalidRequest(format!(
                "collection name {} is reserved",
                keys::SYS_KS
            )));
        }
        let sys = txn.keyspace(keys::SYS_KS)?;
        let key = keys::spec_key(&spec.name);
        if txn.get(&sys, &key)?.is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let value = bson::to_vec(spec).map_err(|e| EngineError::Serialization(e.to_string()))?;
        txn.create_keyspace(&spec.name)?;
        txn.put(&sys, &key, &value)?;
        txn.put(&sys, &keys::seq_key(&spec.name), &keys::encode_u64(0))?;
        txn.put(&sys, &keys::size_key(&spec.name), &keys::encode_u64(0))?;
        Ok(CreateOutcome::Created)
    }

    pub(crate) fn spec<T: Transaction>(
        &self,
        txn: &T,
        collection: &str,
    ) -> Result<Option<CollectionSpec>, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        match txn.get(&sys, &keys::spec_key(collection))? {
            Some(bytes) => {
                let spec = bson::from_slice(&bytes)
                    .map_err(|e| EngineError::Serialization(e.to_string()))?;
                Ok(Some(spec))
            }
            None => Ok(None),
        }
    }

    pub(crate) fn list_collections<T: Transaction>(
        &self,
        txn: &T,
    ) -> Result<Vec<String>, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        let mut names = Vec::new();
        for result in txn.scan_prefix(&sys, keys::spec_scan_prefix())? {
            let (key, _) = result?;
            if let Some(name) = keys::spec_name(&key) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    pub(crate) fn drop_collection<T: Transaction>(
        &self,
        txn: &mut T,
        collection: &str,
    ) -> Result<(), EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        txn.delete(&sys, &keys::spec_key(collection))?;
        txn.delete(&sys, &keys::seq_key(collection))?;
        txn.delete(&sys, &keys::size_key(collection))?;

        let index_keys: Vec<Vec<u8>> = txn
            .scan_prefix(&sys, &keys::index_scan_prefix(collection))?
            .map(|r| r.map(|(k, _)| k))
            .collect::<Result<_, _>>()?;
        for key in index_keys {
            txn.delete(&sys, &key)?;
        }

        txn.drop_keyspace(collection)?;
        Ok(())
    }

    // ── Indexes ─────────────────────────────────────────────────

    /// Record an index on a field, returning its descriptor. Idempotent.
    pub(crate) fn create_index<T: Transaction>(
        &self,
        txn: &mut T,
        collection: &str,
        field: &str,
    ) -> Result<String, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        txn.put(&sys, &keys::index_key(collection, field), &[])?;
        Ok(format!("{field}_1"))
    }

    pub(crate) fn list_indexes<T: Transaction>(
        &self,
        txn: &T,
        collection: &str,
    ) -> Result<Vec<String>, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        let prefix = keys::index_scan_prefix(collection);
        let mut fields = Vec::new();
        for result in txn.scan_prefix(&sys, &prefix)? {
            let (key, _) = result?;
            if let Some(rest) = key.strip_prefix(prefix.as_slice()) {
                if let Ok(field) = std::str::from_utf8(rest) {
                    fields.push(field.to_string());
                }
            }
        }
        Ok(fields)
    }

    // ── Counters ────────────────────────────────────────────────

    /// Reserve `count` insertion sequence numbers, returning the first.
    pub(crate) fn next_seq<T: Transaction>(
        &self,
        txn: &T,
        collection: &str,
        count: u64,
    ) -> Result<u64, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        let key = keys::seq_key(collection);
        let current = match txn.get(&sys, &key)? {
            Some(bytes) => keys::decode_u64(&bytes)
                .ok_or_else(|| EngineError::Serialization("corrupt sequence counter".into()))?,
            None => 0,
        };
        txn.put(&sys, &key, &keys::encode_u64(current + count))?;
        Ok(current)
    }

    pub(crate) fn stored_size<T: Transaction>(
        &self,
        txn: &T,
        collection: &str,
    ) -> Result<u64, EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        match txn.get(&sys, &keys::size_key(collection))? {
            Some(bytes) => keys::decode_u64(&bytes)
                .ok_or_else(|| EngineError::Serialization("corrupt size counter".into())),
            None => Ok(0),
        }
    }

    pub(crate) fn set_stored_size<T: Transaction>(
        &self,
        txn: &T,
        collection: &str,
        size: u64,
    ) -> Result<(), EngineError> {
        let sys = txn.keyspace(keys::SYS_KS)?;
        txn.put(&sys, &keys::size_key(collection), &keys::encode_u64(size))?;
        Ok(())
    }
}
