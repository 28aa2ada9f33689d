//! Database administration: listing databases and dropping one.

use anyhow::{Context, Result};
use mongodb::bson::{doc, Document};
use mongodb::Client as MongoClient;

/// Server-internal databases hidden from listings and never dropped.
pub const SYSTEM_DATABASES: [&str; 3] = ["admin", "local", "config"];

pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES.contains(&name)
}

/// Collections of one database with their document counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub name: String,
    pub collections: Vec<(String, u64)>,
}

impl DatabaseSummary {
    pub fn total_documents(&self) -> u64 {
        self.collections.iter().map(|(_, count)| count).sum()
    }
}

/// Names of the user databases on the server, sorted.
pub async fn list_databases(client: &MongoClient) -> Result<Vec<String>> {
    let mut names: Vec<String> = client
        .list_database_names()
        .await
        .context("Failed to list databases")?
        .into_iter()
        .filter(|name| !is_system_database(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Summarize a database, or `None` when the server does not know it.
pub async fn describe_database(client: &MongoClient, name: &str) -> Result<Option<DatabaseSummary>> {
    let existing = client
        .list_database_names()
        .await
        .context("Failed to list databases")?;
    if !existing.iter().any(|db| db == name) {
        return Ok(None);
    }

    let db = client.database(name);
    let mut collection_names = db
        .list_collection_names()
        .await
        .with_context(|| format!("Failed to list collections of '{name}'"))?;
    collection_names.sort();

    let mut collections = Vec::with_capacity(collection_names.len());
    for collection in collection_names {
        let count = db
            .collection::<Document>(&collection)
            .count_documents(doc! {})
            .await
            .with_context(|| format!("Failed to count documents in '{name}.{collection}'"))?;
        collections.push((collection, count));
    }

    Ok(Some(DatabaseSummary {
        name: name.to_string(),
        collections,
    }))
}

/// Drop a user database and confirm it is gone from the server listing.
///
/// Returns `false` when the database still shows up after the drop.
pub async fn drop_database(client: &MongoClient, name: &str) -> Result<bool> {
    if is_system_database(name) {
        anyhow::bail!("Refusing to drop system database '{name}'");
    }

    client
        .database(name)
        .drop()
        .await
        .with_context(|| format!("Failed to drop database '{name}'"))?;
    tracing::info!("Dropped database '{}'", name);

    let remaining = client
        .list_database_names()
        .await
        .context("Failed to list databases")?;
    Ok(!remaining.iter().any(|db| db == name))
}
