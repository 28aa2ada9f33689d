//! Local filesystem access for snapshot files

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::SNAPSHOT_EXTENSION;

/// A collection snapshot file found in a database directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Collection name derived from the file name (extension stripped)
    pub collection: String,
}

/// Read a whole file into memory
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// List the snapshot files of a database directory in lexical filename order
///
/// Only regular files ending in `.json` are returned; subdirectories and other
/// files are skipped.
pub async fn list_snapshot_files(dir: &Path) -> Result<Vec<SnapshotFile>> {
    let mut results = Vec::new();

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        let metadata = entry
            .metadata()
            .await
            .with_context(|| format!("Failed to get metadata for: {}", entry_path.display()))?;

        if !metadata.is_file() {
            tracing::debug!("Skipping non-file entry: {}", entry_path.display());
            continue;
        }

        let is_snapshot = entry_path
            .extension()
            .is_some_and(|ext| ext == SNAPSHOT_EXTENSION);
        let stem = entry_path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty());

        match (is_snapshot, stem) {
            (true, Some(stem)) => {
                let collection = stem.to_string();
                results.push(SnapshotFile {
                    path: entry_path,
                    collection,
                });
            }
            _ => tracing::debug!("Skipping non-snapshot file: {}", entry_path.display()),
        }
    }

    results.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(results)
}

/// Write `contents` to `path` so that the final name only ever holds a
/// complete file
///
/// The data goes to a temporary file in the same directory, is synced, and
/// is then renamed over `path`. On any error the temporary file is removed.
pub async fn write_atomic(path: &Path, contents: Vec<u8>) -> Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &contents))
        .await
        .context("Atomic write task panicked")?
}

fn write_atomic_blocking(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in: {}", dir.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for: {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file for: {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move temporary file onto: {}", path.display()))?;

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
