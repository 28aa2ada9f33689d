//! Reverse conversion: JSON value → PortableValue.
//!
//! A JSON object with exactly one key that is a marker key is lifted into the
//! matching marker variant. The payload must be a string; canonical extended
//! JSON dates (`{"$date": {"$numberLong": "<millis>"}}`) are accepted too.
//! Payload contents are only checked for shape here, the BSON codec validates
//! them.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value};
use transfer_core::error::Result;
use transfer_core::{CodecError, FieldError, PortableDocument, PortableValue};

use crate::{DATE_MARKER, OID_MARKER};

/// Convert a JSON value from a snapshot file into a portable value.
pub fn json_to_portable(value: Value) -> Result<PortableValue> {
    match value {
        Value::Null => Ok(PortableValue::Null),
        Value::Bool(b) => Ok(PortableValue::Bool(b)),
        Value::Number(n) => number_to_portable(&n),
        Value::String(s) => Ok(PortableValue::String(s)),
        Value::Array(arr) => {
            let mut values = Vec::with_capacity(arr.len());
            for (index, item) in arr.into_iter().enumerate() {
                values.push(json_to_portable(item).map_err(|e| e.in_element(index))?);
            }
            Ok(PortableValue::Array(values))
        }
        Value::Object(map) => object_to_portable(map),
    }
}

/// Convert one array element of a snapshot file into a document.
pub fn json_to_document(value: Value) -> Result<PortableDocument> {
    match value {
        Value::Object(map) => fields_to_document(map),
        other => Err(FieldError::here(CodecError::UnexpectedShape {
            expected: "object",
            found: json_kind(&other),
        })),
    }
}

fn object_to_portable(map: Map<String, Value>) -> Result<PortableValue> {
    if map.len() == 1 {
        if let Some(payload) = map.get(OID_MARKER) {
            return match payload {
                Value::String(hex) => Ok(PortableValue::ObjectId(hex.clone())),
                other => Err(malformed(OID_MARKER, other, "payload must be a string")),
            };
        }
        if let Some(payload) = map.get(DATE_MARKER) {
            return date_payload(payload).map(PortableValue::DateTime);
        }
    }
    fields_to_document(map).map(PortableValue::Object)
}

fn fields_to_document(map: Map<String, Value>) -> Result<PortableDocument> {
    let mut doc = PortableDocument::with_capacity(map.len());
    for (key, value) in map {
        let converted = json_to_portable(value).map_err(|e| e.in_field(&key))?;
        doc.insert(key, converted);
    }
    Ok(doc)
}

fn date_payload(payload: &Value) -> Result<String> {
    match payload {
        Value::String(iso) => Ok(iso.clone()),
        Value::Object(inner) if inner.len() == 1 => {
            let Some(Value::String(millis)) = inner.get("$numberLong") else {
                return Err(malformed(DATE_MARKER, payload, "unsupported payload object"));
            };
            let millis: i64 = millis
                .parse()
                .map_err(|_| malformed(DATE_MARKER, payload, "$numberLong is not an integer"))?;
            DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                .ok_or_else(|| malformed(DATE_MARKER, payload, "instant out of range"))
        }
        other => Err(malformed(DATE_MARKER, other, "payload must be a string")),
    }
}

fn number_to_portable(n: &Number) -> Result<PortableValue> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(small) => PortableValue::Int32(small),
            Err(_) => PortableValue::Int64(i),
        });
    }
    if n.is_u64() {
        return Err(FieldError::here(CodecError::UnexpectedShape {
            expected: "integer within the int64 range",
            found: "unsigned integer above int64::MAX",
        }));
    }
    match n.as_f64() {
        Some(f) => Ok(PortableValue::Double(f)),
        None => Err(FieldError::here(CodecError::UnexpectedShape {
            expected: "number",
            found: "unrepresentable number",
        })),
    }
}

fn malformed(marker: &'static str, payload: &Value, reason: &str) -> FieldError {
    FieldError::here(CodecError::MalformedMarker {
        marker,
        payload: payload.to_string(),
        reason: reason.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
