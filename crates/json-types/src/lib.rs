//! JSON wire-format conversions for transfer-core types.
//!
//! This crate converts between transfer-core's `PortableValue` and the JSON
//! representation stored in snapshot files. Unique ids and timestamps are
//! written as single-key marker objects:
//!
//! ```text
//! {"_id": {"$oid": "507f1f77bcf86cd799439011"}, "joined": {"$date": "2024-01-15T10:30:00.000Z"}}
//! ```
//!
//! # Modules
//!
//! - [`forward`] - PortableValue → JSON value conversion
//! - [`reverse`] - JSON value → PortableValue conversion

pub mod forward;
pub mod reverse;

pub use forward::{document_to_json, portable_to_json};
pub use reverse::{json_to_document, json_to_portable};

/// Marker key of an encoded unique id.
pub const OID_MARKER: &str = "$oid";

/// Marker key of an encoded timestamp.
pub const DATE_MARKER: &str = "$date";
