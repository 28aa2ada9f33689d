//! Collection importer.

use json_types::json_to_document;
use mongo_transfer_file::read_file;
use mongodb::bson::Document;
use mongodb_types::decode_document;
use serde_json::Value;
use std::path::Path;

use crate::error::TransferError;
use crate::traits::TargetDatabase;

/// Import one snapshot file into `collection` and return the number of
/// documents inserted.
///
/// The whole file is decoded before anything is inserted; a single bad
/// document rejects the file. Inserts go out in ordered batches of at most
/// `batch_size` documents and stop at the first rejected batch.
pub async fn import_file<T: TargetDatabase + ?Sized>(
    source_path: &Path,
    target: &T,
    collection: &str,
    batch_size: usize,
) -> Result<u64, TransferError> {
    let bytes = read_file(source_path)
        .await
        .map_err(|source| TransferError::Read {
            path: source_path.to_path_buf(),
            source,
        })?;
    let documents = parse_snapshot(source_path, &bytes)?;

    if documents.is_empty() {
        tracing::info!("No documents in {}", source_path.display());
        return Ok(0);
    }

    let mut inserted = 0u64;
    for batch in documents.chunks(batch_size.max(1)) {
        let count = target
            .insert_batch(collection, batch)
            .await
            .map_err(|source| TransferError::Insert {
                collection: collection.to_string(),
                inserted,
                source,
            })?;
        inserted += count;
        tracing::debug!(
            "Inserted {}/{} documents into '{}'",
            inserted,
            documents.len(),
            collection
        );
    }

    Ok(inserted)
}

/// Parse and decode a snapshot file body.
///
/// The top level must be an array of objects; a single top-level object is
/// accepted as a one-document snapshot.
pub fn parse_snapshot(path: &Path, bytes: &[u8]) -> Result<Vec<Document>, TransferError> {
    let parsed: Value = serde_json::from_slice(bytes).map_err(|e| TransferError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let elements = match parsed {
        Value::Array(elements) => elements,
        Value::Object(map) => vec![Value::Object(map)],
        other => {
            return Err(TransferError::Parse {
                path: path.to_path_buf(),
                reason: format!("top-level value is {}", top_level_kind(&other)),
            })
        }
    };

    let mut documents = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        let decoded = json_to_document(element)
            .and_then(decode_document)
            .map_err(|source| TransferError::DocumentDecoding {
                path: path.to_path_buf(),
                index,
                source,
            })?;
        documents.push(decoded);
    }
    Ok(documents)
}

fn top_level_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
