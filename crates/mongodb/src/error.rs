//! Error taxonomy of the transfer pipeline.
//!
//! `Connection` and `Enumeration` are fatal for a run. Every other variant
//! is scoped to one collection or file: the orchestrator records it in the
//! report and moves on to the next unit.

use std::path::PathBuf;
use thiserror::Error;
use transfer_core::{CodecError, FieldError};

#[derive(Debug, Error)]
pub enum TransferError {
    /// Client could not be created or the server did not answer a ping.
    #[error("Failed to connect to MongoDB")]
    Connection(#[source] anyhow::Error),

    /// Listing collections or snapshot files failed, or the snapshot
    /// directory could not be prepared.
    #[error("Failed to enumerate {what}")]
    Enumeration {
        what: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source cursor could not be opened or failed mid-stream.
    #[error("Failed to read collection '{collection}'")]
    CollectionRead {
        collection: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to encode document {index} of collection '{collection}'")]
    DocumentEncoding {
        collection: String,
        index: usize,
        #[source]
        source: FieldError,
    },

    #[error("Failed to write snapshot file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read snapshot file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Snapshot file {} is not a JSON document array: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to decode document {index} of {}", .path.display())]
    DocumentDecoding {
        path: PathBuf,
        index: usize,
        #[source]
        source: FieldError,
    },

    /// The target rejected a batch; `inserted` documents of the file were
    /// already committed by earlier batches.
    #[error("Failed to insert into collection '{collection}' after {inserted} documents")]
    Insert {
        collection: String,
        inserted: u64,
        #[source]
        source: anyhow::Error,
    },
}

impl TransferError {
    /// Whether this error aborts the whole run rather than a single unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Enumeration { .. })
    }

    /// Taxonomy name, used in the transfer report.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "ConnectionError",
            Self::Enumeration { .. } => "EnumerationError",
            Self::CollectionRead { .. } => "CollectionReadError",
            Self::DocumentEncoding { source, .. } => {
                codec_kind(&source.cause).unwrap_or("DocumentEncodingError")
            }
            Self::DocumentDecoding { source, .. } => {
                codec_kind(&source.cause).unwrap_or("DocumentDecodingError")
            }
            Self::Write { .. } => "WriteError",
            Self::Read { .. } => "ReadError",
            Self::Parse { .. } => "ParseError",
            Self::Insert { .. } => "InsertError",
        }
    }

    /// The codec failure behind a document-level error, if any.
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            Self::DocumentEncoding { source, .. } | Self::DocumentDecoding { source, .. } => {
                Some(&source.cause)
            }
            _ => None,
        }
    }
}

fn codec_kind(err: &CodecError) -> Option<&'static str> {
    match err {
        CodecError::UnsupportedType { .. } => Some("UnsupportedType"),
        CodecError::MalformedMarker { .. } => Some("MalformedMarker"),
        CodecError::UnexpectedShape { .. } => None,
    }
}
