//! In-memory storage implementation for the mapper.
//!
//! This module provides a simple but complete in-memory backend that stores
//! raw documents in nested maps guarded by an async-aware read-write lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::Document;
use futures::{StreamExt, stream};
use mea::rwlock::RwLock;
use uuid::Uuid;

use docmap_core::{
    backend::{
        DocumentStream, IndexOptions, StoreBackend, StoreBackendBuilder, UpdateOps, WriteAck,
    },
    error::{MapperError, MapperResult},
    id::{ID_FIELD, Id},
    query::{Projection, Query},
};

use crate::matcher::matches;

type CollectionMap = HashMap<String, Document>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document storage backend.
///
/// Implements [`StoreBackend`] over nested `HashMap`s: collection name to
/// document-identity-keyed documents. `MemoryBackend` is cloneable and uses
/// an `Arc`-wrapped internal state, so clones of the same instance share the
/// same underlying data across async tasks.
///
/// Queries scan all documents in a collection (no indexing), which is fine
/// for the test and small-deployment workloads this backend targets.
#[derive(Default, Clone, Debug)]
pub struct MemoryBackend {
    /// The main storage map: collection name -> (document id -> document)
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing a `MemoryBackend`.
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder
    }
}

fn project(document: &Document, projection: Option<&Projection>) -> Document {
    let Some(projection) = projection else {
        return document.clone();
    };

    let mut out = Document::new();
    if let Some(id) = document.get(ID_FIELD) {
        out.insert(ID_FIELD, id.clone());
    }
    for field in projection.fields() {
        if field.as_str() == ID_FIELD {
            continue;
        }
        if let Some(value) = document.get(field) {
            out.insert(field, value.clone());
        }
    }

    out
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn count(&self, collection: &str, query: Query) -> MapperResult<u64> {
        let store = self.store.read().await;

        Ok(store.get(collection).map_or(0, |documents| {
            documents
                .values()
                .filter(|document| matches(document, query.criteria()))
                .count() as u64
        }))
    }

    async fn find(
        &self,
        collection: &str,
        query: Query,
        projection: Option<Projection>,
    ) -> MapperResult<DocumentStream> {
        let store = self.store.read().await;
        let documents: Vec<MapperResult<Document>> = store
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| matches(document, query.criteria()))
                    .map(|document| Ok(project(document, projection.as_ref())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(stream::iter(documents).boxed())
    }

    async fn find_one(
        &self,
        collection: &str,
        query: Query,
        projection: Option<Projection>,
    ) -> MapperResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(store.get(collection).and_then(|documents| {
            documents
                .values()
                .find(|document| matches(document, query.criteria()))
                .map(|document| project(document, projection.as_ref()))
        }))
    }

    async fn insert(&self, collection: &str, mut document: Document) -> MapperResult<Document> {
        let mut store = self.store.write().await;
        let documents = store.entry(collection.to_string()).or_default();

        let id = match document.get(ID_FIELD) {
            Some(value) => Id::from_bson(value).ok_or_else(|| {
                MapperError::Serialization("document identity must be a string".to_string())
            })?,
            None => {
                let id = self.new_id();
                document.insert(ID_FIELD, id.clone());
                id
            }
        };

        if documents.contains_key(id.as_str()) {
            return Err(MapperError::DuplicateIdentity(id));
        }
        documents.insert(id.as_str().to_string(), document.clone());

        Ok(document)
    }

    async fn update(&self, collection: &str, id: &Id, ops: UpdateOps) -> MapperResult<WriteAck> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Err(MapperError::UnknownCollection(collection.to_string()));
        };

        match documents.get_mut(id.as_str()) {
            Some(document) => {
                for (field, value) in ops.set_fields() {
                    document.insert(field, value.clone());
                }
                Ok(WriteAck { modified: 1 })
            }
            // no upsert: a partial update against a missing identity reports
            // zero modified documents
            None => Ok(WriteAck { modified: 0 }),
        }
    }

    async fn delete_one(&self, collection: &str, query: Query) -> MapperResult<u64> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(0);
        };

        let key = documents
            .iter()
            .find(|(_, document)| matches(document, query.criteria()))
            .map(|(key, _)| key.clone());

        match key {
            Some(key) => {
                documents.remove(&key);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, query: Query) -> MapperResult<u64> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(0);
        };

        let keys: Vec<String> = documents
            .iter()
            .filter(|(_, document)| matches(document, query.criteria()))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &keys {
            documents.remove(key);
        }

        Ok(keys.len() as u64)
    }

    async fn create_collection(&self, name: &str) -> MapperResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn create_index(
        &self,
        _collection: &str,
        _field: &str,
        _options: IndexOptions,
    ) -> MapperResult<()> {
        // the in-memory backend scans; index declarations are accepted and
        // ignored
        Ok(())
    }

    fn new_id(&self) -> Id {
        Id::from(Uuid::new_v4())
    }
}

/// Builder for constructing [`MemoryBackend`] instances.
#[derive(Default)]
pub struct MemoryBackendBuilder;

#[async_trait]
impl StoreBackendBuilder for MemoryBackendBuilder {
    type Backend = MemoryBackend;

    /// Builds and returns a new [`MemoryBackend`]. Always succeeds.
    async fn build(self) -> MapperResult<Self::Backend> {
        Ok(MemoryBackend::new())
    }
}
