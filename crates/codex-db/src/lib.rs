mod catalog;
mod collection;
mod compare;
mod database;
mod error;
mod keys;
mod matcher;
mod pipeline;
mod result;
mod shape;
mod validator;

pub use bson::{Bson, Document};
pub use collection::{CappedOptions, CollectionSpec};
pub use database::{Database, EngineTransaction};
pub use error::EngineError;
pub use matcher::{field_value, matches};
pub use result::{CreateOutcome, DeleteResult, InsertManyResult, InsertResult, UpdateResult};
pub use shape::shape;
pub use validator::{FieldRule, ValidationFailure, Validator, validate};
