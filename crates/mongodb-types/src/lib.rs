//! MongoDB/BSON conversions for transfer-core types.
//!
//! This crate provides the value and document codecs between MongoDB's BSON
//! values and transfer-core's `PortableValue`.
//!
//! # Modules
//!
//! - [`reverse`] - BSON value → PortableValue (export direction)
//! - [`forward`] - PortableValue → BSON value (import direction)
//! - [`document`] - Whole-document conversion in both directions
//!
//! # Supported types
//!
//! Null, Boolean, Int32, Int64, finite Double, String, Array, embedded
//! Document, ObjectId and DateTime. Every other BSON type is rejected with
//! [`CodecError::UnsupportedType`](transfer_core::CodecError::UnsupportedType).
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//! use mongodb_types::{decode_document, encode_document};
//!
//! let original = doc! { "name": "Alice" };
//! let portable = encode_document(original.clone())?;
//! assert_eq!(decode_document(portable)?, original);
//! ```

pub mod document;
pub mod forward;
pub mod reverse;

pub use document::{decode_document, encode_document};
pub use forward::portable_to_bson;
pub use reverse::bson_to_portable;

/// Marker key of an encoded unique id.
pub const OID_MARKER: &str = "$oid";

/// Marker key of an encoded timestamp.
pub const DATE_MARKER: &str = "$date";
