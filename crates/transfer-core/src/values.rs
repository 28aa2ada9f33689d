//! Portable value representations.
//!
//! `PortableValue` is the tagged union every codec converts through. Two
//! variants are markers for native types that plain JSON cannot distinguish
//! from strings: document identifiers and instants in time.

/// Database-independent value.
#[derive(Debug, Clone, PartialEq)]
pub enum PortableValue {
    /// Null value
    Null,

    /// Boolean value
    Bool(bool),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 64-bit floating point (always finite)
    Double(f64),

    /// String value
    String(String),

    /// Ordered sequence of values
    Array(Vec<PortableValue>),

    /// Nested document, field order preserved
    Object(PortableDocument),

    /// Unique id marker: 24 lowercase hex characters
    ObjectId(String),

    /// Timestamp marker: RFC 3339 / ISO 8601 string
    DateTime(String),
}

impl PortableValue {
    /// Create a unique id marker.
    pub fn object_id(hex: impl Into<String>) -> Self {
        Self::ObjectId(hex.into())
    }

    /// Create a timestamp marker.
    pub fn datetime(iso: impl Into<String>) -> Self {
        Self::DateTime(iso.into())
    }

    /// Try to get this value as a nested document.
    pub fn as_object(&self) -> Option<&PortableDocument> {
        match self {
            Self::Object(doc) => Some(doc),
            _ => None,
        }
    }

    /// Short name of the variant, used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::ObjectId(_) => "objectId",
            Self::DateTime(_) => "date",
        }
    }
}

impl From<bool> for PortableValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for PortableValue {
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<i64> for PortableValue {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<&str> for PortableValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PortableValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<PortableDocument> for PortableValue {
    fn from(doc: PortableDocument) -> Self {
        Self::Object(doc)
    }
}

/// Ordered mapping of field name to [`PortableValue`].
///
/// Insertion order is kept exactly; equality compares fields in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortableDocument {
    fields: Vec<(String, PortableValue)>,
}

impl PortableDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Insert a field. An existing field with the same name keeps its
    /// position and has its value replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PortableValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&PortableValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PortableValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for PortableDocument {
    type Item = (String, PortableValue);
    type IntoIter = std::vec::IntoIter<(String, PortableValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K: Into<String>, V: Into<PortableValue>> FromIterator<(K, V)> for PortableDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = PortableDocument::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}
