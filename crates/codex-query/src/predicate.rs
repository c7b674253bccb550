use bson::Bson;
use serde::{Deserialize, Serialize};

/// A boolean expression tree evaluated per-document. Pure — no side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// All children must match. An empty conjunction matches everything
    /// (the empty filter document).
    And(Vec<Predicate>),
    /// At least one child must match.
    Or(Vec<Predicate>),
    /// No child may match — logical NOT of logical OR.
    Nor(Vec<Predicate>),
    /// Equality against a scalar, or any-element equality against an array field.
    Eq(String, Bson),
    /// Ordered comparison. Missing or incomparable fields never match.
    Cmp(String, CmpOp, Bson),
    /// True if the field's value (or any element of an array field) equals
    /// one of the listed values.
    In(String, Vec<Bson>),
    /// True if the *stored* representation of the field matches the tag.
    Type(String, TypeTag),
    /// Field presence test. The one predicate that can match an absent field.
    Exists(String, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Coarse type tag over stored values.
///
/// `Int` covers both 32- and 64-bit integer representations; `Double` is
/// floating-point only. The distinction is meaningful because documents
/// preserve the numeric representation they were inserted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Int,
    Double,
    String,
    Bool,
    Null,
    Date,
    Array,
    Object,
}

impl TypeTag {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(TypeTag::Int),
            "double" => Some(TypeTag::Double),
            "string" => Some(TypeTag::String),
            "bool" => Some(TypeTag::Bool),
            "null" => Some(TypeTag::Null),
            "date" => Some(TypeTag::Date),
            "array" => Some(TypeTag::Array),
            "object" => Some(TypeTag::Object),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Null => "null",
            TypeTag::Date => "date",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    /// Whether a stored value carries this tag.
    pub fn matches(&self, value: &Bson) -> bool {
        match (self, value) {
            (TypeTag::Int, Bson::Int32(_) | Bson::Int64(_)) => true,
            (TypeTag::Double, Bson::Double(_)) => true,
            (TypeTag::String, Bson::String(_)) => true,
            (TypeTag::Bool, Bson::Boolean(_)) => true,
            (TypeTag::Null, Bson::Null) => true,
            (TypeTag::Date, Bson::DateTime(_)) => true,
            (TypeTag::Array, Bson::Array(_)) => true,
            (TypeTag::Object, Bson::Document(_)) => true,
            _ => false,
        }
    }
}
