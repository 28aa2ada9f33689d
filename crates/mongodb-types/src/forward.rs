//! Forward conversion: PortableValue → BSON value.
//!
//! Marker payloads are validated here; a payload that does not parse as an
//! ObjectId or an RFC 3339 instant is a `MalformedMarker` error.

use bson::oid::ObjectId;
use bson::{Bson, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use transfer_core::error::Result;
use transfer_core::{CodecError, FieldError, PortableValue};

use crate::{DATE_MARKER, OID_MARKER};

/// Convert a portable value into the BSON value inserted into MongoDB.
pub fn portable_to_bson(value: PortableValue) -> Result<Bson> {
    match value {
        PortableValue::Null => Ok(Bson::Null),
        PortableValue::Bool(b) => Ok(Bson::Boolean(b)),
        PortableValue::Int32(i) => Ok(Bson::Int32(i)),
        PortableValue::Int64(i) => Ok(Bson::Int64(i)),
        PortableValue::Double(f) => Ok(Bson::Double(f)),
        PortableValue::String(s) => Ok(Bson::String(s)),

        PortableValue::Array(values) => {
            let mut arr = Vec::with_capacity(values.len());
            for (index, item) in values.into_iter().enumerate() {
                arr.push(portable_to_bson(item).map_err(|e| e.in_element(index))?);
            }
            Ok(Bson::Array(arr))
        }

        PortableValue::Object(fields) => {
            let mut doc = bson::Document::new();
            for (key, val) in fields {
                let converted = portable_to_bson(val).map_err(|e| e.in_field(&key))?;
                doc.insert(key, converted);
            }
            Ok(Bson::Document(doc))
        }

        PortableValue::ObjectId(hex) => parse_object_id(&hex).map(Bson::ObjectId),

        PortableValue::DateTime(iso) => parse_datetime(&iso)
            .map(|dt| Bson::DateTime(BsonDateTime::from_chrono(dt))),
    }
}

/// Parse a `$oid` payload: exactly 24 lowercase hex characters.
pub fn parse_object_id(hex: &str) -> Result<ObjectId> {
    if hex.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(malformed(
            OID_MARKER,
            hex,
            "hex digits must be lowercase".to_string(),
        ));
    }
    // ObjectId::parse_str also enforces the 12-byte length
    ObjectId::parse_str(hex).map_err(|e| malformed(OID_MARKER, hex, e.to_string()))
}

/// Parse a `$date` payload into a UTC instant.
///
/// Any RFC 3339 offset is accepted; sub-millisecond digits are dropped when
/// the instant is stored as a BSON DateTime.
pub fn parse_datetime(iso: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| malformed(DATE_MARKER, iso, e.to_string()))
}

fn malformed(marker: &'static str, payload: &str, reason: String) -> FieldError {
    FieldError::here(CodecError::MalformedMarker {
        marker,
        payload: payload.to_string(),
        reason,
    })
}
