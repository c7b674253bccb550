//! Key layout.
//!
//! Collection keyspaces hold one record per document, keyed by an 8-byte
//! big-endian insertion sequence, so an ascending prefix scan replays
//! insertion order. The `_sys` keyspace holds collection specs, index
//! markers, and the per-collection sequence/size counters.

pub(crate) const SYS_KS: &str = "_sys";

const RECORD_PREFIX: &[u8] = b"r:";
const SPEC_PREFIX: &[u8] = b"col:";
const INDEX_PREFIX: &[u8] = b"idx:";
const SEQ_PREFIX: &[u8] = b"seq:";
const SIZE_PREFIX: &[u8] = b"size:";

pub(crate) fn record_key(seq: u64) -> Vec<u8> {
    let mut key = RECORD_PREFIX.to_vec();
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

pub(crate) fn record_scan_prefix() -> &'static [u8] {
    RECORD_PREFIX
}

pub(crate) fn spec_key(collection: &str) -> Vec<u8> {
    let mut key = SPEC_PREFIX.to_vec();
    key.extend_from_slice(collection.as_bytes());
    key
}

pub(crate) fn spec_scan_prefix() -> &'static [u8] {
    SPEC_PREFIX
}

pub(crate) fn spec_name(key: &[u8]) -> Option<&str> {
    key.strip_prefix(SPEC_PREFIX)
        .and_then(|rest| std::str::from_utf8(rest).ok())
}

pub(crate) fn index_key(collection: &str, field: &str) -> Vec<u8> {
    let mut key = index_scan_prefix(collection);
    key.extend_from_slice(field.as_bytes());
    key
}

pub(crate) fn index_scan_prefix(collection: &str) -> Vec<u8> {
    let mut key = INDEX_PREFIX.to_vec();
    key.extend_from_slice(collection.as_bytes());
    key.push(b':');
    key
}

pub(crate) fn seq_key(collection: &str) -> Vec<u8> {
    let mut key = SEQ_PREFIX.to_vec();
    key.extend_from_slice(collection.as_bytes());
    key
}

pub(crate) fn size_key(collection: &str) -> Vec<u8> {
    let mut key = SIZE_PREFIX.to_vec();
    key.extend_from_slice(collection.as_bytes());
    key
}

pub(crate) fn encode_u64(n: u64) -> Vec<u8> {
    n.to_be_bytes().to_vec()
}

pub(crate) fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}
