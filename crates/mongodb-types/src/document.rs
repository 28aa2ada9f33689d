//! Document codec.
//!
//! Applies the value codec to every field of one document. Conversion is all
//! or nothing: the first failing field aborts the document and is reported
//! with its full path.

use bson::Document;
use transfer_core::error::Result;
use transfer_core::PortableDocument;

use crate::forward::portable_to_bson;
use crate::reverse::bson_to_portable;

/// Encode a BSON document read from MongoDB, keeping field order.
pub fn encode_document(doc: Document) -> Result<PortableDocument> {
    let mut out = PortableDocument::with_capacity(doc.len());
    for (key, value) in doc {
        let converted = bson_to_portable(value).map_err(|e| e.in_field(&key))?;
        out.insert(key, converted);
    }
    Ok(out)
}

/// Decode a portable document into the BSON document to insert.
pub fn decode_document(doc: PortableDocument) -> Result<Document> {
    let mut out = Document::new();
    for (key, value) in doc {
        let converted = portable_to_bson(value).map_err(|e| e.in_field(&key))?;
        out.insert(key, converted);
    }
    Ok(out)
}
