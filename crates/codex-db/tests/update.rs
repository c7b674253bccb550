mod common;

use bson::doc;
use codex_db::EngineError;
use common::{COLLECTION, books_db, filter};

#[test]
fn update_sets_fields_on_the_first_match() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let result = txn
        .update_one(
            COLLECTION,
            &filter(doc! { "_id": "b3" }),
            doc! { "year": 1987, "edition": "revised" },
        )
        .unwrap();
    assert_eq!(result.matched, 1);
    assert_eq!(result.modified, 1);

    let stored = txn
        .find_one(COLLECTION, &filter(doc! { "_id": "b3" }))
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_i32("year").unwrap(), 1987);
    assert_eq!(stored.get_str("edition").unwrap(), "revised");
    // Untouched fields survive the merge.
    assert_eq!(stored.get_str("title").unwrap(), "It");
}

#[test]
fn update_targets_insertion_order() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    // Two documents carry the Drama genre; only the older one changes.
    txn.update_one(
        COLLECTION,
        &filter(doc! { "genres": "Drama" }),
        doc! { "flagged": true },
    )
    .unwrap();

    let flagged = txn
        .find(
            COLLECTION,
            Some(&filter(doc! { "flagged": true })),
            &Default::default(),
        )
        .unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].get_str("title").unwrap(), "Emma");
}

#[test]
fn update_without_a_match_reports_zero() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let result = txn
        .update_one(
            COLLECTION,
            &filter(doc! { "title": "Missing" }),
            doc! { "year": 2000 },
        )
        .unwrap();
    assert_eq!(result.matched, 0);
    assert_eq!(result.modified, 0);
}

#[test]
fn update_with_identical_values_counts_as_unmodified() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let result = txn
        .update_one(
            COLLECTION,
            &filter(doc! { "_id": "b1" }),
            doc! { "title": "Dune" },
        )
        .unwrap();
    assert_eq!(result.matched, 1);
    assert_eq!(result.modified, 0);
}

#[test]
fn update_cannot_patch_the_id() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let err = txn
        .update_one(
            COLLECTION,
            &filter(doc! { "_id": "b1" }),
            doc! { "_id": "b9" },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRequest(_)));
}

#[test]
fn update_revalidates_the_merged_document() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let err = txn
        .update_one(
            COLLECTION,
            &filter(doc! { "_id": "b1" }),
            doc! { "title": 42 },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // The rejected update must not leak through.
    let stored = txn
        .find_one(COLLECTION, &filter(doc! { "_id": "b1" }))
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_str("title").unwrap(), "Dune");
}

#[test]
fn update_on_unknown_collection_is_an_error() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();

    let err = txn
        .update_one("missing", &filter(doc! {}), doc! { "year": 2000 })
        .unwrap_err();
    assert!(matches!(err, EngineError::CollectionNotFound(_)));
}
