//! In-memory source/target database for pipeline tests.

#![allow(dead_code)]

use anyhow::Result;
use futures::stream;
use mongo_transfer_mongodb::{DocumentStream, SourceDatabase, TargetDatabase};
use mongodb::bson::Document;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    /// Collections in creation order
    collections: Vec<(String, Vec<Document>)>,
    batch_sizes: Vec<usize>,
}

impl State {
    fn collection_mut(&mut self, name: &str) -> &mut Vec<Document> {
        if let Some(pos) = self.collections.iter().position(|(n, _)| n == name) {
            &mut self.collections[pos].1
        } else {
            self.collections.push((name.to_string(), Vec::new()));
            &mut self.collections.last_mut().unwrap().1
        }
    }
}

/// Behaves like a MongoDB database for the pipeline: ordered collections,
/// ordered inserts that stop at the first duplicate `_id`.
pub struct MemoryDatabase {
    name: String,
    state: Mutex<State>,
    cursor_failures: HashMap<String, usize>,
    fail_listing: bool,
}

impl MemoryDatabase {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(State::default()),
            cursor_failures: HashMap::new(),
            fail_listing: false,
        }
    }

    pub fn with_collection(self, name: &str, documents: Vec<Document>) -> Self {
        self.state
            .lock()
            .unwrap()
            .collection_mut(name)
            .extend(documents);
        self
    }

    /// Make the cursor over `collection` fail after yielding `after` documents.
    pub fn fail_cursor_after(mut self, collection: &str, after: usize) -> Self {
        self.cursor_failures.insert(collection.to_string(), after);
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .iter()
            .find(|(n, _)| n == collection)
            .map(|(_, docs)| docs.clone())
            .unwrap_or_default()
    }

    pub fn collection_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.collections.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }
}

#[async_trait::async_trait]
impl SourceDatabase for MemoryDatabase {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn list_collection_names(&self) -> Result<Vec<String>> {
        if self.fail_listing {
            anyhow::bail!("listCollections not authorized");
        }
        Ok(self.collection_names())
    }

    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream> {
        let documents = self.documents(collection);
        let mut items: Vec<Result<Document>> = Vec::new();
        match self.cursor_failures.get(collection) {
            Some(&after) => {
                items.extend(documents.into_iter().take(after).map(Ok));
                items.push(Err(anyhow::anyhow!("cursor killed by server")));
            }
            None => items.extend(documents.into_iter().map(Ok)),
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

#[async_trait::async_trait]
impl TargetDatabase for MemoryDatabase {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn insert_batch(&self, collection: &str, documents: &[Document]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.batch_sizes.push(documents.len());
        let stored = state.collection_mut(collection);
        let mut inserted = 0u64;
        for doc in documents {
            if let Some(id) = doc.get("_id") {
                if stored.iter().any(|existing| existing.get("_id") == Some(id)) {
                    anyhow::bail!("E11000 duplicate key error collection: {collection} _id: {id}");
                }
            }
            stored.push(doc.clone());
            inserted += 1;
        }
        Ok(inserted)
    }
}
