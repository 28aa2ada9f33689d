//! Transfer orchestrator: drives export and import runs one unit at a time.

use mongo_transfer_file::{list_snapshot_files, SnapshotLayout};
use std::path::{Path, PathBuf};
use transfer_core::TransferReport;

use crate::error::TransferError;
use crate::export::export_collection;
use crate::import::import_file;
use crate::traits::{SourceDatabase, TargetDatabase};

/// Maximum number of documents sent in one insert batch by default
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    pub connection_string: String,
    /// Database whose snapshot directory is written (export) or read (import)
    pub database: String,
    /// Root of the snapshot tree
    pub directory: PathBuf,
    pub batch_size: usize,
}

/// Target database name used when the caller does not supply one.
pub fn default_target_database(source_database: &str) -> String {
    format!("{source_database}_imported")
}

pub struct Orchestrator {
    config: TransferConfig,
}

impl Orchestrator {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }

    fn layout(&self) -> SnapshotLayout {
        SnapshotLayout::new(&self.config.directory, &self.config.database)
    }

    /// Export every collection of `source` into the snapshot directory.
    ///
    /// Only failing to prepare the directory or to list collections aborts
    /// the run; a failing collection is recorded and the run continues.
    pub async fn export<S: SourceDatabase + ?Sized>(
        &self,
        source: &S,
    ) -> Result<TransferReport, TransferError> {
        let layout = self.layout();
        let dir = layout
            .ensure_database_dir()
            .await
            .map_err(|source| TransferError::Enumeration {
                what: "snapshot directory".to_string(),
                source,
            })?;

        let collections =
            source
                .list_collection_names()
                .await
                .map_err(|e| TransferError::Enumeration {
                    what: format!("collections of database '{}'", source.database_name()),
                    source: e,
                })?;
        tracing::info!(
            "Exporting {} collections from '{}' to {}",
            collections.len(),
            source.database_name(),
            dir.display()
        );

        let mut report = TransferReport::new();
        for collection in &collections {
            let destination = layout.collection_path(collection);
            match export_collection(source, collection, &destination).await {
                Ok(count) => {
                    tracing::info!(
                        "Exported {} documents from '{}' to {}",
                        count,
                        collection,
                        destination.display()
                    );
                    report.record_success(collection.as_str(), count, count);
                }
                Err(e) => {
                    let kind = e.kind();
                    let e = anyhow::Error::new(e);
                    tracing::warn!("Skipping collection '{}': {:#}", collection, e);
                    remove_stale_snapshot(&destination).await;
                    report.record_failure(collection.as_str(), kind, e);
                }
            }
        }

        tracing::info!("Export finished: {}", report);
        Ok(report)
    }

    /// Import every snapshot file of the configured database into `target`,
    /// in lexical filename order.
    pub async fn import<T: TargetDatabase + ?Sized>(
        &self,
        target: &T,
    ) -> Result<TransferReport, TransferError> {
        let dir = self.layout().database_dir();
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(TransferError::Enumeration {
                what: "snapshot files".to_string(),
                source: anyhow::anyhow!("Snapshot directory {} does not exist", dir.display()),
            });
        }

        let files = list_snapshot_files(&dir)
            .await
            .map_err(|source| TransferError::Enumeration {
                what: "snapshot files".to_string(),
                source,
            })?;

        let mut report = TransferReport::new();
        if files.is_empty() {
            tracing::warn!("No snapshot files found in {}", dir.display());
            return Ok(report);
        }
        tracing::info!(
            "Importing {} files from {} into '{}'",
            files.len(),
            dir.display(),
            target.database_name()
        );

        for file in &files {
            match import_file(&file.path, target, &file.collection, self.config.batch_size).await
            {
                Ok(count) => {
                    tracing::info!(
                        "Imported {} documents into '{}'",
                        count,
                        file.collection
                    );
                    report.record_success(file.collection.as_str(), count, count);
                }
                Err(e) => {
                    let kind = e.kind();
                    let e = anyhow::Error::new(e);
                    tracing::warn!("Skipping {}: {:#}", file.path.display(), e);
                    report.record_failure(file.collection.as_str(), kind, e);
                }
            }
        }

        tracing::info!("Import finished: {}", report);
        Ok(report)
    }
}

/// Remove the file an earlier run left for a collection that just failed.
async fn remove_stale_snapshot(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::warn!("Removed stale snapshot {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Stale snapshot {} could not be removed: {}",
            path.display(),
            e
        ),
    }
}
