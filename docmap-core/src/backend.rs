//! Storage backend abstraction for the mapper.
//!
//! This module defines the trait that abstracts over concrete document
//! stores. The mapper core never talks to storage directly; every read and
//! write flows through a [`StoreBackend`], so backends can range from the
//! bundled in-memory store to remote document databases.
//!
//! A raw document is a flat [`bson::Document`] whose reserved `_id` field
//! holds the document's identity. Backends are required to be thread-safe
//! (`Send + Sync`) and internally safe for concurrent access; every operation
//! is asynchronous and the mapper suspends only at these call boundaries.
//!
//! Backend failures are propagated to callers unchanged — the mapper never
//! retries on a backend's behalf.

use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;
use std::fmt::Debug;

use crate::{
    error::MapperResult,
    id::Id,
    query::{Projection, Query},
};

/// A finite, lazily consumed sequence of raw documents. Restartable only by
/// reissuing the query that produced it.
pub type DocumentStream = BoxStream<'static, MapperResult<Document>>;

/// Field-level update operations for a partial write.
///
/// The mapper's change tracker produces field-scoped deltas; this type is the
/// backend-facing vocabulary those deltas translate into. Semantics are
/// set/replace per field — nested structures are replaced whole, never
/// merged.
#[derive(Debug, Clone, Default)]
pub struct UpdateOps {
    set: Document,
}

impl UpdateOps {
    /// Update operations that set each field in `fields` to its new value.
    pub fn set(fields: Document) -> Self {
        Self { set: fields }
    }

    /// The fields to set, mapped to their new values.
    pub fn set_fields(&self) -> &Document {
        &self.set
    }
}

/// Acknowledgement of a partial update.
///
/// Exposes only what the backend reported; in particular it does not imply
/// the stored document was refetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteAck {
    /// Number of documents the update touched.
    pub modified: u64,
}

/// Options for index creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

/// Abstract interface for document storage backends.
///
/// Implementations provide the primitive operations the mapper builds on:
/// counting, finding, inserting, partially updating, and deleting raw
/// documents in named collections, plus collection and index administration
/// and identity generation.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Counts the documents in `collection` matching `query`.
    async fn count(&self, collection: &str, query: Query) -> MapperResult<u64>;

    /// Finds the documents in `collection` matching `query`, returned as a
    /// lazy stream. `projection` limits which fields each document carries.
    async fn find(
        &self,
        collection: &str,
        query: Query,
        projection: Option<Projection>,
    ) -> MapperResult<DocumentStream>;

    /// Finds one document in `collection` matching `query`, or `None`.
    async fn find_one(
        &self,
        collection: &str,
        query: Query,
        projection: Option<Projection>,
    ) -> MapperResult<Option<Document>>;

    /// Inserts a new document, assigning an identity if the document carries
    /// none, and returns the document as stored.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::DuplicateIdentity`](crate::error::MapperError)
    /// when a document with the same identity already exists.
    async fn insert(&self, collection: &str, document: Document) -> MapperResult<Document>;

    /// Applies field-level update operations to the document with identity
    /// `id`. A missing document is not an error; the acknowledgement reports
    /// zero modified documents.
    async fn update(&self, collection: &str, id: &Id, ops: UpdateOps) -> MapperResult<WriteAck>;

    /// Deletes at most one document matching `query`, returning the number
    /// removed.
    async fn delete_one(&self, collection: &str, query: Query) -> MapperResult<u64>;

    /// Deletes every document matching `query`, returning the number removed.
    async fn delete_many(&self, collection: &str, query: Query) -> MapperResult<u64>;

    /// Creates the named collection. Creating an existing collection is a
    /// no-op.
    async fn create_collection(&self, name: &str) -> MapperResult<()>;

    /// Creates an index on `field` in `collection`.
    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        options: IndexOptions,
    ) -> MapperResult<()>;

    /// Produces a fresh opaque identity.
    fn new_id(&self) -> Id;
}

/// Factory trait for constructing backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    /// The backend type this builder produces.
    type Backend: StoreBackend;

    /// Builds and returns the backend.
    async fn build(self) -> MapperResult<Self::Backend>;
}
