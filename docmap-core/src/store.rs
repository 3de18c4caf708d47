//! The model store: a backend plus an explicit schema registry.
//!
//! A [`ModelStore`] owns the storage backend and the set of registered
//! schemas. Registration is the declaration point of a schema's lifecycle:
//! it creates the backing collection, applies the schema's index
//! declarations, and makes the schema available to collection facades and
//! reference resolution. After registration the registry is read-only and
//! safely shared across concurrently executing operations.
//!
//! There is no process-wide registry; every store carries its own.
//!
//! # Example
//!
//! ```ignore
//! use docmap::{field::FieldKind, schema::Schema, store::ModelStore};
//! use docmap::memory::MemoryBackend;
//!
//! let mut store = ModelStore::new(MemoryBackend::new());
//! store
//!     .register(
//!         Schema::builder("tags")
//!             .field("name", FieldKind::string())
//!             .build(),
//!     )
//!     .await?;
//! let tags = store.collection("tags")?;
//! ```

use std::{collections::HashMap, sync::Arc};

use crate::{
    backend::{IndexOptions, StoreBackend},
    collection::Collection,
    error::{MapperError, MapperResult},
    schema::Schema,
};

/// A document store bound to a backend, with a registry of named schemas.
#[derive(Debug)]
pub struct ModelStore<B: StoreBackend> {
    backend: B,
    schemas: HashMap<String, Arc<Schema>>,
}

impl<B: StoreBackend> ModelStore<B> {
    /// Creates a store over the given backend with an empty registry.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            schemas: HashMap::new(),
        }
    }

    /// Registers a schema: creates its backing collection, applies its index
    /// declarations, and records it in the registry. Registering a schema
    /// again replaces the previous definition.
    pub async fn register(&mut self, schema: Schema) -> MapperResult<()> {
        self.backend
            .create_collection(schema.collection_name())
            .await?;

        for index in schema.indexes() {
            self.backend
                .create_index(
                    schema.collection_name(),
                    index.field(),
                    IndexOptions { unique: index.is_unique() },
                )
                .await?;
        }

        self.schemas
            .insert(schema.collection_name().to_string(), Arc::new(schema));

        Ok(())
    }

    /// Looks up the registered schema for `collection`.
    pub fn schema(&self, collection: &str) -> MapperResult<&Arc<Schema>> {
        self.schemas
            .get(collection)
            .ok_or_else(|| MapperError::UnknownCollection(collection.to_string()))
    }

    /// Returns the collection facade for a registered schema.
    pub fn collection(&self, name: &str) -> MapperResult<Collection<'_, B>> {
        Ok(Collection::new(self.schema(name)?.clone(), self))
    }

    /// The underlying storage backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
