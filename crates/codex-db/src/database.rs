use std::collections::{HashSet, VecDeque};

use bson::{Bson, Document};
use codex_query::{FindOptions, Predicate, Stage};
use codex_store::{Store, Transaction};

use crate::catalog::Catalog;
use crate::collection::CollectionSpec;
use crate::error::EngineError;
use crate::keys;
use crate::matcher::matches;
use crate::pipeline;
use crate::result::{CreateOutcome, DeleteResult, InsertManyResult, InsertResult, UpdateResult};
use crate::shape::shape;
use crate::validator::validate;

/// The engine itself is stateless; the live store is an explicit handle whose
/// lifecycle belongs to the caller. Every operation runs inside an
/// [`EngineTransaction`] snapshot obtained from [`Database::begin`].
pub struct Database<S: Store> {
    store: S,
}

impl<S: Store> Database<S> {
    pub fn open(store: S) -> Result<Self, EngineError> {
        store.create_keyspace(keys::SYS_KS)?;
        Ok(Self { store })
    }

    pub fn begin(&self, read_only: bool) -> Result<EngineTransaction<'_, S>, EngineError> {
        let txn = self.store.begin(read_only)?;
        Ok(EngineTransaction {
            txn,
            catalog: Catalog,
        })
    }
}

/// One stored record: its key, decoded document, and encoded size.
struct Record {
    key: Vec<u8>,
    size: u64,
    doc: Document,
}

pub struct EngineTransaction<'db, S: Store + 'db> {
    txn: S::Txn<'db>,
    catalog: Catalog,
}

impl<'db, S: Store + 'db> EngineTransaction<'db, S> {
    // ── Collection management ───────────────────────────────────

    /// Create a collection. Idempotent — a second creation call returns
    /// [`CreateOutcome::AlreadyExists`] and leaves the stored spec (validator,
    /// capped options) untouched.
    pub fn create_collection(
        &mut self,
        spec: &CollectionSpec,
    ) -> Result<CreateOutcome, EngineError> {
        self.catalog.create_collection(&mut self.txn, spec)
    }

    /// Record an index on a field, returning its descriptor. Creates the
    /// collection implicitly if it doesn't exist yet.
    pub fn create_index(&mut self, collection: &str, field: &str) -> Result<String, EngineError> {
        if self.catalog.spec(&self.txn, collection)?.is_none() {
            self.catalog
                .create_collection(&mut self.txn, &CollectionSpec::new(collection))?;
        }
        self.catalog.create_index(&mut self.txn, collection, field)
    }

    pub fn list_collections(&self) -> Result<Vec<String>, EngineError> {
        self.catalog.list_collections(&self.txn)
    }

    pub fn list_indexes(&self, collection: &str) -> Result<Vec<String>, EngineError> {
        self.catalog.list_indexes(&self.txn, collection)
    }

    /// Drop a collection with all its documents and metadata.
    pub fn drop_collection(&mut self, collection: &str) -> Result<(), EngineError> {
        self.require_spec(collection)?;
        self.catalog.drop_collection(&mut self.txn, collection)
    }

    // ── Insert operations ───────────────────────────────────────

    /// Insert a single document. A missing `_id` gets a generated one;
    /// validation failure rejects the insert with the store unchanged.
    pub fn insert_one(
        &mut self,
        collection: &str,
        doc: Document,
    ) -> Result<InsertResult, EngineError> {
        let mut results = self.insert_docs(collection, vec![doc])?;
        Ok(results.remove(0))
    }

    /// Insert a batch. All-or-nothing: every document is validated (and
    /// checked for id collisions) before anything is written.
    pub fn insert_many(
        &mut self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<InsertManyResult, EngineError> {
        if docs.is_empty() {
            return Err(EngineError::InvalidRequest(
                "batch insert requires at least one document".into(),
            ));
        }
        let results = self.insert_docs(collection, docs)?;
        Ok(InsertManyResult {
            inserted: results.len() as u64,
        })
    }

    // ── Query operations ────────────────────────────────────────

    /// Find documents matching a predicate, then shape (sort, skip, limit,
    /// projection). No predicate means every document.
    pub fn find(
        &self,
        collection: &str,
        predicate: Option<&Predicate>,
        options: &FindOptions,
    ) -> Result<Vec<Document>, EngineError> {
        let docs = self.read_all(collection)?;
        let docs = match predicate {
            Some(predicate) => docs
                .into_iter()
                .filter(|doc| matches(doc, predicate))
                .collect(),
            None => docs,
        };
        Ok(shape(docs, options))
    }

    /// First document matching the predicate, in insertion order.
    pub fn find_one(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<Option<Document>, EngineError> {
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        let mut docs = self.find(collection, Some(predicate), &options)?;
        Ok(docs.pop())
    }

    /// Run an aggregation pipeline against the collection. Every stage —
    /// including `$lookup` reads of other collections — observes this
    /// transaction's snapshot.
    pub fn aggregate(
        &self,
        collection: &str,
        stages: &[Stage],
    ) -> Result<Vec<Document>, EngineError> {
        let input = self.read_all(collection)?;
        pipeline::execute(self, input, stages)
    }

    // ── Update / delete operations ──────────────────────────────

    /// Set fields on the first document matching the predicate. The merged
    /// document is re-validated before commit; `_id` cannot be patched.
    pub fn update_one(
        &mut self,
        collection: &str,
        predicate: &Predicate,
        set: Document,
    ) -> Result<UpdateResult, EngineError> {
        if set.contains_key("_id") {
            return Err(EngineError::InvalidRequest("_id is immutable".into()));
        }
        let spec = self.require_spec(collection)?;
        let ks = self.collection_ks(collection)?;

        let record = match self
            .read_records(collection)?
            .into_iter()
            .find(|record| matches(&record.doc, predicate))
        {
            Some(record) => record,
            None => {
                return Ok(UpdateResult {
                    matched: 0,
                    modified: 0,
                });
            }
        };

        let mut updated = record.doc.clone();
        let mut changed = false;
        for (key, value) in set {
            if updated.get(&key) != Some(&value) {
                changed = true;
            }
            updated.insert(key, value);
        }

        if let Some(validator) = &spec.validator {
            validate(&updated, validator)?;
        }

        if !changed {
            return Ok(UpdateResult {
                matched: 1,
                modified: 0,
            });
        }

        let bytes = encode_document(&updated)?;
        let total = self
            .catalog
            .stored_size(&self.txn, collection)?
            .saturating_sub(record.size)
            + bytes.len() as u64;
        if let Some(capped) = spec.capped {
            // A growing update cannot evict its way to space; reject instead.
            if total > capped.max_bytes {
                return Err(EngineError::InvalidRequest(format!(
                    "update would exceed capped collection size ({} bytes)",
                    capped.max_bytes
                )));
            }
        }

        self.txn.put(&ks, &record.key, &bytes)?;
        self.catalog.set_stored_size(&self.txn, collection, total)?;
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    /// Delete every document matching the predicate.
    pub fn delete_many(
        &mut self,
        collection: &str,
        predicate: &Predicate,
    ) -> Result<DeleteResult, EngineError> {
        self.require_spec(collection)?;
        let ks = self.collection_ks(collection)?;

        let mut total = self.catalog.stored_size(&self.txn, collection)?;
        let mut deleted = 0u64;
        for record in self.read_records(collection)? {
            if matches(&record.doc, predicate) {
                self.txn.delete(&ks, &record.key)?;
                total = total.saturating_sub(record.size);
                deleted += 1;
            }
        }
        self.catalog.set_stored_size(&self.txn, collection, total)?;
        Ok(DeleteResult { deleted })
    }

    // ── Lifecycle ───────────────────────────────────────────────

    pub fn commit(self) -> Result<(), EngineError> {
        self.txn.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), EngineError> {
        self.txn.rollback()?;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────

    /// All documents of a collection in insertion order.
    pub(crate) fn read_all(&self, collection: &str) -> Result<Vec<Document>, EngineError> {
        Ok(self
            .read_records(collection)?
            .into_iter()
            .map(|record| record.doc)
            .collect())
    }

    fn read_records(&self, collection: &str) -> Result<Vec<Record>, EngineError> {
        let ks = self.collection_ks(collection)?;
        let mut records = Vec::new();
        for result in self.txn.scan_prefix(&ks, keys::record_scan_prefix())? {
            let (key, value) = result?;
            records.push(Record {
                size: value.len() as u64,
                doc: decode_document(&value)?,
                key,
            });
        }
        Ok(records)
    }

    fn insert_docs(
        &mut self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<Vec<InsertResult>, EngineError> {
        let spec = match self.catalog.spec(&self.txn, collection)? {
            Some(spec) => spec,
            None => {
                // First insert into an unknown collection creates it
                // implicitly, with no validator and no cap.
                let spec = CollectionSpec::new(collection);
                self.catalog.create_collection(&mut self.txn, &spec)?;
                spec
            }
        };

        // Validate the whole batch before writing anything.
        if let Some(validator) = &spec.validator {
            for doc in &docs {
                validate(doc, validator)?;
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        if docs.iter().any(|doc| doc.contains_key("_id")) {
            for record in self.read_records(collection)? {
                if let Some(id) = record.doc.get("_id") {
                    seen.insert(id_string(id));
                }
            }
        }

        let mut prepared: Vec<(String, Vec<u8>)> = Vec::with_capacity(docs.len());
        for doc in docs {
            let (id, doc) = assign_id(doc)?;
            if !seen.insert(id.clone()) {
                return Err(EngineError::DuplicateId(id));
            }
            let bytes = encode_document(&doc)?;
            if let Some(capped) = spec.capped {
                if bytes.len() as u64 > capped.max_bytes {
                    return Err(EngineError::InvalidRequest(format!(
                        "document ({} bytes) exceeds capped collection size ({} bytes)",
                        bytes.len(),
                        capped.max_bytes
                    )));
                }
            }
            prepared.push((id, bytes));
        }

        let ks = self.collection_ks(collection)?;
        let mut total = self.catalog.stored_size(&self.txn, collection)?;

        // Oldest-first record queue, needed only when a cap can evict.
        let mut live: VecDeque<(Vec<u8>, u64)> = VecDeque::new();
        if spec.capped.is_some() {
            for result in self.txn.scan_prefix(&ks, keys::record_scan_prefix())? {
                let (key, value) = result?;
                live.push_back((key, value.len() as u64));
            }
        }

        let first_seq = self
            .catalog
            .next_seq(&self.txn, collection, prepared.len() as u64)?;

        let mut results = Vec::with_capacity(prepared.len());
        for (offset, (id, bytes)) in prepared.into_iter().enumerate() {
            let len = bytes.len() as u64;
            if let Some(capped) = spec.capped {
                while total + len > capped.max_bytes {
                    match live.pop_front() {
                        Some((old_key, old_len)) => {
                            self.txn.delete(&ks, &old_key)?;
                            total = total.saturating_sub(old_len);
                        }
                        None => break,
                    }
                }
            }

            let key = keys::record_key(first_seq + offset as u64);
            self.txn.put(&ks, &key, &bytes)?;
            total += len;
            if spec.capped.is_some() {
                live.push_back((key, len));
            }
            results.push(InsertResult { id });
        }

        self.catalog.set_stored_size(&self.txn, collection, total)?;
        Ok(results)
    }

    fn require_spec(&self, collection: &str) -> Result<CollectionSpec, EngineError> {
        self.catalog
            .spec(&self.txn, collection)?
            .ok_or_else(|| EngineError::CollectionNotFound(collection.to_string()))
    }

    /// Resolve a collection keyspace, reporting a missing one as
    /// CollectionNotFound.
    fn collection_ks(
        &self,
        collection: &str,
    ) -> Result<<S::Txn<'db> as Transaction>::Ks, EngineError> {
        self.txn
            .keyspace(collection)
            .map_err(|_| EngineError::CollectionNotFound(collection.to_string()))
    }
}

/// Ensure a document carries a scalar `_id`, generating one when absent.
/// Returns the id's string form alongside the (possibly rebuilt) document.
fn assign_id(doc: Document) -> Result<(String, Document), EngineError> {
    match doc.get("_id") {
        Some(Bson::Array(_)) | Some(Bson::Document(_)) => Err(EngineError::InvalidRequest(
            "_id must be a scalar value".into(),
        )),
        Some(value) => Ok((id_string(value), doc)),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            let mut with_id = Document::new();
            with_id.insert("_id", id.clone());
            for (key, value) in doc {
                with_id.insert(key, value);
            }
            Ok((id, with_id))
        }
    }
}

fn id_string(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode_document(doc: &Document) -> Result<Vec<u8>, EngineError> {
    bson::to_vec(doc).map_err(|e| EngineError::Serialization(e.to_string()))
}

fn decode_document(bytes: &[u8]) -> Result<Document, EngineError> {
    bson::from_slice(bytes).map_err(|e| EngineError::Serialization(e.to_string()))
}
