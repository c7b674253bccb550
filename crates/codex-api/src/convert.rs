//! JSON ⇄ BSON conversion at the HTTP edge.
//!
//! Numeric subtype survives the trip: a JSON integer becomes `Int64`, a
//! fractional number becomes `Double`. Datetimes ride as `{"$date": ...}`
//! wrappers, accepting an RFC 3339 string or epoch milliseconds on the way
//! in and emitting RFC 3339 on the way out.

use bson::{Bson, Document};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub fn json_to_document(value: &Value) -> Result<Document, ApiError> {
    match value {
        Value::Object(map) => object_to_document(map),
        _ => Err(ApiError::BadRequest("expected a JSON object".into())),
    }
}

fn object_to_document(map: &Map<String, Value>) -> Result<Document, ApiError> {
    let mut doc = Document::new();
    for (key, value) in map {
        doc.insert(key.clone(), json_to_bson(value)?);
    }
    Ok(doc)
}

pub fn json_to_bson(value: &Value) -> Result<Bson, ApiError> {
    match value {
        Value::Null => Ok(Bson::Null),
        Value::Bool(b) => Ok(Bson::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Bson::Int64(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Bson::Double(f))
            } else {
                Err(ApiError::BadRequest(format!("unrepresentable number: {n}")))
            }
        }
        Value::String(s) => Ok(Bson::String(s.clone())),
        Value::Array(items) => {
            let items: Result<Vec<Bson>, ApiError> = items.iter().map(json_to_bson).collect();
            Ok(Bson::Array(items?))
        }
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(inner) = map.get("$date") {
                    return parse_date(inner);
                }
            }
            Ok(Bson::Document(object_to_document(map)?))
        }
    }
}

fn parse_date(inner: &Value) -> Result<Bson, ApiError> {
    match inner {
        Value::String(s) => bson::DateTime::parse_rfc3339_str(s)
            .map(Bson::DateTime)
            .map_err(|e| ApiError::BadRequest(format!("invalid $date: {e}"))),
        Value::Number(n) => n
            .as_i64()
            .map(|millis| Bson::DateTime(bson::DateTime::from_millis(millis)))
            .ok_or_else(|| ApiError::BadRequest(format!("invalid $date: {n}"))),
        _ => Err(ApiError::BadRequest(
            "$date must be an RFC 3339 string or epoch milliseconds".into(),
        )),
    }
}

pub fn document_to_json(doc: &Document) -> Value {
    let mut map = Map::with_capacity(doc.len());
    for (key, value) in doc {
        map.insert(key.clone(), bson_to_json(value));
    }
    Value::Object(map)
}

pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::from(*i),
        Bson::Int64(i) => Value::from(*i),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => serde_json::json!({ "$date": s }),
            Err(_) => serde_json::json!({ "$date": dt.timestamp_millis() }),
        },
        other => Value::String(other.to_string()),
    }
}
