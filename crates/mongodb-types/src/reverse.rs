//! Reverse conversion: BSON value → PortableValue.
//!
//! ObjectIds become unique id markers and DateTimes become timestamp markers
//! rendered in UTC with millisecond precision, the full precision BSON keeps.

use bson::Bson;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use transfer_core::error::Result;
use transfer_core::{CodecError, FieldError, PortableDocument, PortableValue};

/// Convert an owned BSON value into its portable form.
pub fn bson_to_portable(value: Bson) -> Result<PortableValue> {
    match value {
        Bson::Null => Ok(PortableValue::Null),
        Bson::Boolean(b) => Ok(PortableValue::Bool(b)),
        Bson::Int32(i) => Ok(PortableValue::Int32(i)),
        Bson::Int64(i) => Ok(PortableValue::Int64(i)),

        // JSON has no token for NaN or the infinities
        Bson::Double(f) if !f.is_finite() => Err(unsupported("non-finite double")),
        Bson::Double(f) => Ok(PortableValue::Double(f)),

        Bson::String(s) => Ok(PortableValue::String(s)),

        Bson::Array(arr) => {
            let mut values = Vec::with_capacity(arr.len());
            for (index, item) in arr.into_iter().enumerate() {
                values.push(bson_to_portable(item).map_err(|e| e.in_element(index))?);
            }
            Ok(PortableValue::Array(values))
        }

        Bson::Document(doc) => {
            let mut out = PortableDocument::with_capacity(doc.len());
            for (key, val) in doc {
                let converted = bson_to_portable(val).map_err(|e| e.in_field(&key))?;
                out.insert(key, converted);
            }
            Ok(PortableValue::Object(out))
        }

        Bson::ObjectId(oid) => Ok(PortableValue::ObjectId(oid.to_hex())),

        Bson::DateTime(dt) => {
            let millis = dt.timestamp_millis();
            let utc = DateTime::<Utc>::from_timestamp_millis(millis)
                .ok_or_else(|| unsupported("datetime outside the calendar range"))?;
            // RFC 3339 only has four-digit years
            if !(0..=9999).contains(&utc.year()) {
                return Err(unsupported("datetime outside the RFC 3339 year range"));
            }
            Ok(PortableValue::DateTime(
                utc.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        }

        Bson::Binary(_) => Err(unsupported("binary")),
        Bson::Decimal128(_) => Err(unsupported("decimal128")),
        Bson::RegularExpression(_) => Err(unsupported("regular expression")),
        Bson::JavaScriptCode(_) => Err(unsupported("javascript code")),
        Bson::JavaScriptCodeWithScope(_) => Err(unsupported("javascript code with scope")),
        Bson::Timestamp(_) => Err(unsupported("timestamp")),
        Bson::Symbol(_) => Err(unsupported("symbol")),
        Bson::Undefined => Err(unsupported("undefined")),
        Bson::MaxKey => Err(unsupported("maxKey")),
        Bson::MinKey => Err(unsupported("minKey")),
        Bson::DbPointer(_) => Err(unsupported("dbPointer")),
    }
}

fn unsupported(bson_type: &'static str) -> FieldError {
    FieldError::here(CodecError::UnsupportedType { bson_type })
}
