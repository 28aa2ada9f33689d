//! MongoDB driver adapter.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{options::ClientOptions, Client as MongoClient, Database};
use std::time::Duration;

use crate::error::TransferError;
use crate::traits::{DocumentStream, SourceDatabase, TargetDatabase};

/// Connect and server-selection timeout applied when none is configured
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a client and verify the server answers a `ping`.
///
/// Any failure here is fatal for the run.
pub async fn connect(
    connection_string: &str,
    timeout: Duration,
) -> Result<MongoClient, TransferError> {
    tracing::debug!("Parsing MongoDB connection options");
    let mut options = ClientOptions::parse(connection_string)
        .await
        .map_err(|e| TransferError::Connection(e.into()))?;
    // Fail fast instead of hanging on an unreachable server
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);
    options.app_name = Some("mongo-transfer".to_string());

    let client =
        MongoClient::with_options(options).map_err(|e| TransferError::Connection(e.into()))?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| TransferError::Connection(e.into()))?;
    tracing::debug!("MongoDB ping succeeded");

    Ok(client)
}

/// One MongoDB database, usable as export source or import target.
#[derive(Clone)]
pub struct MongoDatabase {
    db: Database,
}

impl MongoDatabase {
    pub fn new(client: &MongoClient, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }
}

#[async_trait::async_trait]
impl SourceDatabase for MongoDatabase {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .await?;
        Ok(Box::pin(cursor.map_err(anyhow::Error::from)))
    }
}

#[async_trait::async_trait]
impl TargetDatabase for MongoDatabase {
    fn database_name(&self) -> &str {
        self.db.name()
    }

    async fn insert_batch(&self, collection: &str, documents: &[Document]) -> Result<u64> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_many(documents)
            .await?;
        Ok(result.inserted_ids.len() as u64)
    }
}
