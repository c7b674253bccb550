#![allow(dead_code)]

use std::collections::BTreeMap;

use bson::{Document, doc};
use codex_db::{CollectionSpec, Database, FieldRule, Validator};
use codex_query::{Predicate, TypeTag, parse_filter};
use codex_store::MemoryStore;

pub const COLLECTION: &str = "books";

pub fn empty_db() -> Database<MemoryStore> {
    Database::open(MemoryStore::new()).unwrap()
}

/// `title` required, a string of at least one character.
pub fn title_validator() -> Validator {
    Validator {
        required: vec!["title".to_string()],
        fields: BTreeMap::from([(
            "title".to_string(),
            FieldRule {
                type_tag: Some(TypeTag::String),
                min_length: Some(1),
            },
        )]),
    }
}

pub fn books_db() -> Database<MemoryStore> {
    let db = empty_db();
    let mut txn = db.begin(false).unwrap();
    txn.create_collection(&CollectionSpec::new(COLLECTION).with_validator(title_validator()))
        .unwrap();
    for book in books() {
        txn.insert_one(COLLECTION, book).unwrap();
    }
    txn.commit().unwrap();
    db
}

pub fn books() -> Vec<Document> {
    vec![
        doc! {
            "_id": "b1",
            "title": "Dune",
            "author": "Frank Herbert",
            "year": 1965,
            "genres": ["Science Fiction", "Adventure"],
        },
        doc! {
            "_id": "b2",
            "title": "Emma",
            "author": "Jane Austen",
            "year": 1815,
            "genres": ["Drama", "Romance"],
        },
        doc! {
            "_id": "b3",
            "title": "It",
            "author": "Stephen King",
            "year": 1986,
            "genres": ["Horror"],
        },
        doc! {
            "_id": "b4",
            "title": "Neuromancer",
            "author": "William Gibson",
            "year": 1984,
            "genres": ["Science Fiction"],
        },
        doc! {
            "_id": "b5",
            "title": "Middlemarch",
            "author": "George Eliot",
            // Stored as a double, for the $type cases.
            "year": 1871.0,
            "genres": ["Drama"],
        },
    ]
}

pub fn filter(doc: Document) -> Predicate {
    parse_filter(&doc).unwrap()
}

pub fn titles(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d.get_str("title").unwrap().to_string())
        .collect()
}
