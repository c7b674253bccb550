mod error;
mod find;
mod parse_filter;
mod pipeline;
mod predicate;
mod projection;

pub use error::ParseError;
pub use find::{FindOptions, Sort, SortDirection, parse_sort};
pub use parse_filter::parse_filter;
pub use pipeline::{Lookup, Stage, parse_pipeline};
pub use predicate::{CmpOp, Predicate, TypeTag};
pub use projection::{Projection, parse_projection};
