//! Snapshot directory layout and local file access.
//!
//! A database snapshot lives under one directory per source database, with
//! one JSON file per collection:
//!
//! ```text
//! <root>/<database>/<collection>.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mongo_transfer_file::{list_snapshot_files, write_atomic, SnapshotLayout};
//!
//! let layout = SnapshotLayout::new("mongodb_export", "shop");
//! layout.ensure_database_dir().await?;
//! write_atomic(&layout.collection_path("users"), bytes).await?;
//!
//! for file in list_snapshot_files(&layout.database_dir()).await? {
//!     println!("{} -> {}", file.path.display(), file.collection);
//! }
//! ```

mod local;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use local::{list_snapshot_files, read_file, write_atomic, SnapshotFile};

/// Extension of collection snapshot files (without the dot)
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Default snapshot root directory
pub const DEFAULT_EXPORT_DIRECTORY: &str = "mongodb_export";

/// Location of one database snapshot on disk.
#[derive(Debug, Clone)]
pub struct SnapshotLayout {
    root: PathBuf,
    database: String,
}

impl SnapshotLayout {
    pub fn new(root: impl Into<PathBuf>, database: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            database: database.into(),
        }
    }

    /// `<root>/<database>`
    pub fn database_dir(&self) -> PathBuf {
        self.root.join(&self.database)
    }

    /// `<root>/<database>/<collection>.json`
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.database_dir()
            .join(format!("{collection}.{SNAPSHOT_EXTENSION}"))
    }

    /// Create the database directory (and the root) if missing.
    pub async fn ensure_database_dir(&self) -> Result<PathBuf> {
        let dir = self.database_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(dir)
    }
}
