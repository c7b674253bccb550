mod common;

use bson::doc;
use codex_db::EngineError;
use codex_query::{FindOptions, Projection, Sort, SortDirection};
use common::{COLLECTION, books_db, empty_db, filter, titles};

#[test]
fn find_without_a_filter_returns_everything_in_insertion_order() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let docs = txn.find(COLLECTION, None, &FindOptions::default()).unwrap();
    assert_eq!(
        titles(&docs),
        vec!["Dune", "Emma", "It", "Neuromancer", "Middlemarch"]
    );
}

#[test]
fn equality_filter() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! { "author": "Stephen King" });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert_eq!(titles(&docs), vec!["It"]);
}

#[test]
fn equality_against_an_array_field_matches_elements() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! { "genres": "Drama" });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert_eq!(titles(&docs), vec!["Emma", "Middlemarch"]);
}

#[test]
fn inclusive_range() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! { "year": { "$gte": 1965, "$lte": 1984 } });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert_eq!(titles(&docs), vec!["Dune", "Neuromancer"]);
}

#[test]
fn inverted_range_matches_nothing() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! { "year": { "$gt": 1990, "$lt": 1900 } });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert!(docs.is_empty());
}

#[test]
fn in_operator_over_array_fields() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! { "genres": { "$in": ["Horror", "Romance"] } });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert_eq!(titles(&docs), vec!["Emma", "It"]);
}

#[test]
fn nor_excludes_every_branch() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let predicate = filter(doc! {
        "$nor": [
            { "genres": "Science Fiction" },
            { "genres": "Drama" },
        ]
    });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    // Every survivor carries neither genre.
    assert_eq!(titles(&docs), vec!["It"]);
}

#[test]
fn type_operator_distinguishes_int_from_double() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let ints = txn
        .find(
            COLLECTION,
            Some(&filter(doc! { "year": { "$type": "int" } })),
            &FindOptions::default(),
        )
        .unwrap();
    assert_eq!(ints.len(), 4);

    let doubles = txn
        .find(
            COLLECTION,
            Some(&filter(doc! { "year": { "$type": "double" } })),
            &FindOptions::default(),
        )
        .unwrap();
    assert_eq!(titles(&doubles), vec!["Middlemarch"]);
}

#[test]
fn exists_false_matches_missing_fields() {
    let db = books_db();
    let mut txn = db.begin(false).unwrap();
    txn.insert_one(COLLECTION, doc! { "title": "Anonymous Tales" })
        .unwrap();

    let predicate = filter(doc! { "author": { "$exists": false } });
    let docs = txn
        .find(COLLECTION, Some(&predicate), &FindOptions::default())
        .unwrap();
    assert_eq!(titles(&docs), vec!["Anonymous Tales"]);
}

#[test]
fn sort_skip_limit_compose_in_order() {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    for year in [2020, 1999, 2005, 2010, 1980, 2022] {
        txn.insert_one("books", doc! { "title": year.to_string(), "year": year })
            .unwrap();
    }

    let options = FindOptions {
        sort: Some(Sort {
            field: "year".to_string(),
            direction: SortDirection::Desc,
        }),
        skip: Some(2),
        limit: Some(3),
        ..FindOptions::default()
    };
    let docs = txn.find("books", None, &options).unwrap();
    let years: Vec<i32> = docs.iter().map(|d| d.get_i32("year").unwrap()).collect();
    assert_eq!(years, vec![2010, 2005, 1999]);
}

#[test]
fn inclusion_projection_drops_id_unless_listed() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let options = FindOptions {
        projection: Some(Projection::Include(vec![
            "title".to_string(),
            "year".to_string(),
        ])),
        ..FindOptions::default()
    };
    let docs = txn
        .find(COLLECTION, Some(&filter(doc! { "_id": "b1" })), &options)
        .unwrap();
    assert_eq!(docs, vec![doc! { "title": "Dune", "year": 1965 }]);
}

#[test]
fn exclusion_projection_keeps_the_rest() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let options = FindOptions {
        projection: Some(Projection::Exclude(vec![
            "genres".to_string(),
            "author".to_string(),
        ])),
        ..FindOptions::default()
    };
    let docs = txn
        .find(COLLECTION, Some(&filter(doc! { "_id": "b3" })), &options)
        .unwrap();
    assert_eq!(docs, vec![doc! { "_id": "b3", "title": "It", "year": 1986 }]);
}

#[test]
fn find_one_returns_the_first_match_in_insertion_order() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let doc = txn
        .find_one(COLLECTION, &filter(doc! { "genres": "Science Fiction" }))
        .unwrap()
        .unwrap();
    assert_eq!(doc.get_str("title").unwrap(), "Dune");
}

#[test]
fn find_one_without_a_match_is_none() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let doc = txn
        .find_one(COLLECTION, &filter(doc! { "title": "Missing" }))
        .unwrap();
    assert!(doc.is_none());
}

#[test]
fn find_on_unknown_collection_is_an_error() {
    let db = books_db();
    let txn = db.begin(true).unwrap();

    let err = txn
        .find("missing", None, &FindOptions::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::CollectionNotFound(name) if name == "missing"));
}
