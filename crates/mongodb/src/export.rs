//! Collection exporter.

use futures::StreamExt;
use json_types::document_to_json;
use mongo_transfer_file::write_atomic;
use mongodb_types::encode_document;
use serde_json::Value;
use std::path::Path;
use transfer_core::FieldError;

use crate::error::TransferError;
use crate::traits::SourceDatabase;

/// Export one collection to a snapshot file and return the document count.
///
/// Documents are kept in retrieval order. Nothing is written until the whole
/// cursor has been consumed and every document encoded, and the file is
/// moved into place atomically, so a failed export never leaves a partial
/// file under `destination`.
pub async fn export_collection<S: SourceDatabase + ?Sized>(
    source: &S,
    collection: &str,
    destination: &Path,
) -> Result<u64, TransferError> {
    let read_error = |source: anyhow::Error| TransferError::CollectionRead {
        collection: collection.to_string(),
        source,
    };

    let mut cursor = source.open_cursor(collection).await.map_err(read_error)?;
    let mut documents: Vec<Value> = Vec::new();

    while let Some(next) = cursor.next().await {
        let doc = next.map_err(read_error)?;
        let index = documents.len();
        let encode_error = |source: FieldError| TransferError::DocumentEncoding {
            collection: collection.to_string(),
            index,
            source,
        };
        let portable = encode_document(doc).map_err(encode_error)?;
        let json = document_to_json(portable).map_err(encode_error)?;
        documents.push(Value::Object(json));

        if documents.len() % 10_000 == 0 {
            tracing::debug!("Read {} documents from '{}'", documents.len(), collection);
        }
    }

    let count = documents.len() as u64;
    let bytes = render_snapshot(documents).map_err(|e| TransferError::Write {
        path: destination.to_path_buf(),
        source: e.into(),
    })?;
    write_atomic(destination, bytes)
        .await
        .map_err(|source| TransferError::Write {
            path: destination.to_path_buf(),
            source,
        })?;

    Ok(count)
}

/// Serialize encoded documents as the snapshot file body: a two-space
/// indented JSON array, UTF-8 kept unescaped, with a trailing newline.
pub fn render_snapshot(documents: Vec<Value>) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(&Value::Array(documents))?;
    bytes.push(b'\n');
    Ok(bytes)
}
