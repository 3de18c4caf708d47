//! Error types and result types for mapper operations.
//!
//! This module provides error handling for all mapper operations.
//! Use [`MapperResult<T>`] as the return type for fallible operations.

use bson::{Document, error::Error as BsonError};
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::id::Id;

/// Represents all possible errors that can occur when mapping model instances
/// to a document store.
///
/// This enum covers validation failures, reference resolution, identity
/// collisions, serialization problems, and backend-specific errors.
#[derive(Error, Debug)]
pub enum MapperError {
    /// One or more fields failed validation.
    ///
    /// The payload maps every failing field name, in schema declaration order,
    /// to a diagnostic value: `Bson::Null` for a required field that was
    /// missing, otherwise the offending value itself. Raised before any write
    /// is issued.
    #[error("validation failed for fields [{}]", field_list(.0))]
    Validation(Document),
    /// A non-null reference identifier resolved to no document during a join.
    /// A dangling reference indicates data corruption and is never skipped
    /// silently.
    #[error("reference field {field} points to missing document {id}")]
    ReferenceNotFound {
        /// The reference field whose target could not be fetched.
        field: String,
        /// The identity that resolved to nothing.
        id: Id,
    },
    /// An insert was rejected because a document with the same identity
    /// already exists in the collection.
    #[error("document {0} already exists")]
    DuplicateIdentity(Id),
    /// No schema has been registered for the named collection.
    #[error("no schema registered for collection {0}")]
    UnknownCollection(String),
    /// A persisted instance or stored document is missing its identity.
    #[error("document in collection {0} has no identity")]
    MissingIdentity(String),
    /// Serialization/deserialization error when converting document values.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// An error surfaced by the storage backend, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

impl MapperError {
    /// Returns the failing-field map carried by a [`MapperError::Validation`],
    /// if this is one.
    pub fn failing_fields(&self) -> Option<&Document> {
        match self {
            MapperError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

fn field_list(fields: &Document) -> String {
    fields
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<BsonError> for MapperError {
    fn from(err: BsonError) -> Self {
        MapperError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for MapperError {
    fn from(err: SerdeJsonError) -> Self {
        MapperError::Serialization(err.to_string())
    }
}
