use std::collections::BTreeMap;
use std::fmt;

use bson::{Bson, Document};
use codex_query::TypeTag;
use serde::{Deserialize, Serialize};

use crate::compare::type_name;

/// Declarative per-collection document constraints, checked at insert and
/// update time. Never applied retroactively to documents already stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Validator {
    /// Fields that must be present and non-null.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Per-field constraints, applied only when the field is present.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<TypeTag>,
    /// Minimum length for string values.
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
}

/// The first constraint a document failed: field name plus expected vs actual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field {:?}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

impl std::error::Error for ValidationFailure {}

/// Check a document against a validator, reporting the first failing
/// constraint. Required fields are checked first, then per-field rules in
/// field order. The document is never mutated.
pub fn validate(doc: &Document, validator: &Validator) -> Result<(), ValidationFailure> {
    for field in &validator.required {
        match doc.get(field) {
            None => {
                return Err(ValidationFailure {
                    field: field.clone(),
                    expected: "a present non-null value".into(),
                    actual: "missing".into(),
                });
            }
            Some(Bson::Null) => {
                return Err(ValidationFailure {
                    field: field.clone(),
                    expected: "a present non-null value".into(),
                    actual: "null".into(),
                });
            }
            Some(_) => {}
        }
    }

    for (field, rule) in &validator.fields {
        let value = match doc.get(field) {
            Some(v) => v,
            None => continue,
        };

        if let Some(tag) = rule.type_tag {
            if !tag.matches(value) {
                return Err(ValidationFailure {
                    field: field.clone(),
                    expected: tag.name().to_string(),
                    actual: type_name(value).to_string(),
                });
            }
        }

        if let Some(min_length) = rule.min_length {
            if let Bson::String(s) = value {
                if s.chars().count() < min_length {
                    return Err(ValidationFailure {
                        field: field.clone(),
                        expected: format!("a string of at least {min_length} characters"),
                        actual: format!("{} characters", s.chars().count()),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    fn title_validator() -> Validator {
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

    #[test]
    fn accepts_conforming_document() {
        let doc = doc! { "title": "Dune", "year": 1965 };
        assert!(validate(&doc, &title_validator()).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let failure = validate(&doc! { "year": 1965 }, &title_validator()).unwrap_err();
        assert_eq!(failure.field, "title");
        assert_eq!(failure.actual, "missing");
    }

    #[test]
    fn rejects_null_required_field() {
        let failure = validate(&doc! { "title": null }, &title_validator()).unwrap_err();
        assert_eq!(failure.actual, "null");
    }

    #[test]
    fn rejects_wrong_type() {
        let failure = validate(&doc! { "title": 42 }, &title_validator()).unwrap_err();
        assert_eq!(failure.expected, "string");
        assert_eq!(failure.actual, "int");
    }

    #[test]
    fn rejects_too_short_string() {
        let failure = validate(&doc! { "title": "" }, &title_validator()).unwrap_err();
        assert_eq!(failure.field, "title");
        assert!(failure.expected.contains("at least 1"));
    }

    #[test]
    fn typed_field_unconstrained_when_absent() {
        let validator = Validator {
            required: vec![],
            fields: BTreeMap::from([(
                "year".to_string(),
                FieldRule {
                    type_tag: Some(TypeTag::Int),
                    min_length: None,
                },
            )]),
        };
        assert!(validate(&doc! { "title": "Dune" }, &validator).is_ok());
        assert!(validate(&doc! { "year": 1965.0 }, &validator).is_err());
    }

    #[test]
    fn empty_validator_accepts_anything() {
        assert!(validate(&doc! { "anything": [1, 2, 3] }, &Validator::default()).is_ok());
    }
}
