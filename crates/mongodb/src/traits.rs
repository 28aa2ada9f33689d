//! Database seam used by the exporter, importer and orchestrator.
//!
//! The pipeline is generic over these traits so that each unit of work can
//! be driven against the real driver or an in-memory database:
//!
//! ```ignore
//! pub async fn export_collection<S: SourceDatabase + ?Sized>(
//!     source: &S,
//!     collection: &str,
//!     destination: &Path,
//! ) -> Result<u64, TransferError> {
//!     let mut cursor = source.open_cursor(collection).await?;
//!     // ...
//! }
//! ```

use anyhow::Result;
use futures::Stream;
use mongodb::bson::Document;
use std::pin::Pin;

/// Documents of one collection in natural retrieval order.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document>> + Send>>;

/// Read side of a database.
#[async_trait::async_trait]
pub trait SourceDatabase: Send + Sync {
    fn database_name(&self) -> &str;

    /// Names of all collections, in the order the server reports them.
    async fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Open a cursor over every document of `collection`.
    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream>;
}

/// Write side of a database.
#[async_trait::async_trait]
pub trait TargetDatabase: Send + Sync {
    fn database_name(&self) -> &str;

    /// Insert `documents` in order as one batch and return how many were
    /// inserted. Fails on the first rejected document (e.g. a duplicate
    /// `_id`); documents before it may already be stored.
    async fn insert_batch(&self, collection: &str, documents: &[Document]) -> Result<u64>;
}
