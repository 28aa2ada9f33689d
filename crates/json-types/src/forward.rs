//! Forward conversion: PortableValue → JSON value.

use serde_json::{Map, Number, Value};
use transfer_core::error::Result;
use transfer_core::{CodecError, FieldError, PortableDocument, PortableValue};

use crate::{DATE_MARKER, OID_MARKER};

/// Convert a portable value into its JSON wire form.
pub fn portable_to_json(value: PortableValue) -> Result<Value> {
    match value {
        PortableValue::Null => Ok(Value::Null),
        PortableValue::Bool(b) => Ok(Value::Bool(b)),
        PortableValue::Int32(i) => Ok(Value::Number(i.into())),
        PortableValue::Int64(i) => Ok(Value::Number(i.into())),
        PortableValue::Double(f) => Number::from_f64(f).map(Value::Number).ok_or_else(|| {
            FieldError::here(CodecError::UnsupportedType {
                bson_type: "non-finite double",
            })
        }),
        PortableValue::String(s) => Ok(Value::String(s)),
        PortableValue::Array(values) => {
            let mut arr = Vec::with_capacity(values.len());
            for (index, item) in values.into_iter().enumerate() {
                arr.push(portable_to_json(item).map_err(|e| e.in_element(index))?);
            }
            Ok(Value::Array(arr))
        }
        PortableValue::Object(doc) => document_to_json(doc).map(Value::Object),
        PortableValue::ObjectId(hex) => Ok(marker(OID_MARKER, hex)),
        PortableValue::DateTime(iso) => Ok(marker(DATE_MARKER, iso)),
    }
}

/// Convert a portable document into a JSON object, keeping field order.
pub fn document_to_json(doc: PortableDocument) -> Result<Map<String, Value>> {
    let mut map = Map::with_capacity(doc.len());
    for (key, value) in doc {
        let converted = portable_to_json(value).map_err(|e| e.in_field(&key))?;
        map.insert(key, converted);
    }
    Ok(map)
}

fn marker(key: &str, payload: String) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), Value::String(payload));
    Value::Object(map)
}
