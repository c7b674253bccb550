mod common;

use bson::doc;
use codex_db::{CollectionSpec, CreateOutcome, EngineError};
use common::{COLLECTION, books_db, empty_db, title_validator};

#[test]
fn create_collection_is_idempotent() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();

    let first = txn
        .create_collection(&CollectionSpec::new("books"))
        .unwrap();
    let second = txn
        .create_collection(&CollectionSpec::new("books"))
        .unwrap();

    assert_eq!(first, CreateOutcome::Created);
    assert_eq!(second, CreateOutcome::AlreadyExists);
}

#[test]
fn recreating_a_collection_keeps_the_stored_validator() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    txn.create_collection(&CollectionSpec::new("books").with_validator(title_validator()))
        .unwrap();

    // A second create with no validator must not loosen the stored one.
    let outcome = txn
        .create_collection(&CollectionSpec::new("books"))
        .unwrap();
    assert_eq!(outcome, CreateOutcome::AlreadyExists);

    let err = txn
        .insert_one("books", doc! { "author": "anonymous" })
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn list_collections_reports_created_names() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    txn.create_collection(&CollectionSpec::new("books")).unwrap();
    txn.create_collection(&CollectionSpec::new("authors"))
        .unwrap();

    let mut names = txn.list_collections().unwrap();
    names.sort();
    assert_eq!(names, vec!["authors", "books"]);
}

#[test]
fn create_index_returns_descriptor_and_is_listed() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let descriptor = txn.create_index(COLLECTION, "year").unwrap();
    assert_eq!(descriptor, "year_1");
    assert_eq!(txn.list_indexes(COLLECTION).unwrap(), vec!["year"]);
}

#[test]
fn create_index_on_unknown_collection_creates_it() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();

    txn.create_index("logs", "level").unwrap();
    assert_eq!(txn.list_collections().unwrap(), vec!["logs"]);
}

#[test]
fn drop_collection_removes_documents_and_metadata() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();
    txn.create_index(COLLECTION, "year").unwrap();

    txn.drop_collection(COLLECTION).unwrap();

    assert!(txn.list_collections().unwrap().is_empty());
    let err = txn
        .find(COLLECTION, None, &Default::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::CollectionNotFound(_)));
}

#[test]
fn drop_then_recreate_starts_empty() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();
    txn.drop_collection(COLLECTION).unwrap();
    txn.create_collection(&CollectionSpec::new(COLLECTION))
        .unwrap();

    assert!(txn.find(COLLECTION, None, &Default::default()).unwrap().is_empty());
    txn.commit().unwrap();

    let txn = db.begin(true).unwrap();
    assert!(txn.find(COLLECTION, None, &Default::default()).unwrap().is_empty());
}

#[test]
fn drop_then_insert_keeps_only_the_new_document() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();
    txn.drop_collection(COLLECTION).unwrap();
    // Implicit re-creation through the insert.
    txn.insert_one(COLLECTION, doc! { "_id": "n1", "title": "New" })
        .unwrap();
    txn.commit().unwrap();

    let txn = db.begin(true).unwrap();
    let docs = txn.find(COLLECTION, None, &Default::default()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_str("_id").unwrap(), "n1");
}

#[test]
fn drop_unknown_collection_is_an_error() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    let err = txn.drop_collection("missing").unwrap_err();
    assert!(matches!(err, EngineError::CollectionNotFound(name) if name == "missing"));
}

#[test]
fn system_keyspace_name_is_reserved() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();

    let err = txn
        .create_collection(&CollectionSpec::new("_sys"))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));

    // Implicit creation through an insert is rejected the same way.
    let err = txn.insert_one("_sys", doc! { "x": 1 }).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}

#[test]
fn capped_options_round_trip_through_the_catalog() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    txn.create_collection(&CollectionSpec::new("logs").capped(1024))
        .unwrap();
    txn.commit().unwrap();

    // Reopen in a fresh transaction; the cap must still be enforced.
    let mut txn = db.begin(false).unwrap();
    let big = "x".repeat(2048);
    let err = txn
        .insert_one("logs", doc! { "message": big })
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}
