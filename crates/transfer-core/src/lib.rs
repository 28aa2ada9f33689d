//! Core types for the mongo-transfer framework.
//!
//! This crate provides the foundational types shared by every other crate:
//!
//! - [`PortableValue`] - Lossless, database-independent value representation
//! - [`PortableDocument`] - Ordered field-name to value mapping
//! - [`FieldPath`] - Location of a value inside a document, for error reporting
//! - [`TransferReport`] - Per-collection counts and failures of one run
//! - [`CodecError`] / [`FieldError`] - Conversion failures shared by the codec crates
//!
//! # Architecture
//!
//! ```text
//! transfer-core (this crate)
//!    │
//!    ├─── mongodb-types   (BSON ⇄ PortableValue)
//!    ├─── json-types      (PortableValue ⇄ JSON wire form)
//!    └─── mongo-transfer-mongodb (export/import pipeline)
//! ```

pub mod error;
pub mod path;
pub mod report;
pub mod values;

pub use error::{CodecError, FieldError};
pub use path::{FieldPath, PathSegment};
pub use report::{TransferReport, UnitFailure, UnitReport};
pub use values::{PortableDocument, PortableValue};
