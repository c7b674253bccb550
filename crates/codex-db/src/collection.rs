use serde::{Deserialize, Serialize};

use crate::validator::Validator;

/// Per-collection metadata, fixed at creation time. Re-creating an existing
/// collection never replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capped: Option<CappedOptions>,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: None,
            capped: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn capped(mut self, max_bytes: u64) -> Self {
        self.capped = Some(CappedOptions { max_bytes });
        self
    }
}

/// Fixed storage capacity. Inserting past `max_bytes` evicts the
/// oldest-inserted documents until the total fits again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CappedOptions {
    #[serde(rename = "maxBytes")]
    pub max_bytes: u64,
}
