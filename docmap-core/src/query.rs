//! Query criteria and projections for backend reads.
//!
//! The mapper deliberately keeps its query surface small: a [`Query`] is a
//! flat set of field-equality criteria (an empty query matches everything),
//! and a [`Projection`] is an include-list of field names. Translating a
//! richer query language is a backend concern, not the mapper's.

use bson::{Bson, Document};

use crate::id::Id;

/// Flat field-equality criteria for selecting documents.
///
/// # Example
///
/// ```ignore
/// use docmap::query::Query;
///
/// let everything = Query::new();
/// let by_name = Query::new().field("name", "zero");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    criteria: Document,
}

impl Query {
    /// An empty query, matching every document in the collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// A query selecting the document with the given identity.
    pub fn by_id(id: &Id) -> Self {
        Query::new().field(crate::id::ID_FIELD, id.to_bson())
    }

    /// Adds an equality criterion on `field`.
    pub fn field(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.criteria.insert(field.into(), value.into());
        self
    }

    /// The criteria document: every entry must match for a document to be
    /// selected.
    pub fn criteria(&self) -> &Document {
        &self.criteria
    }
}

impl From<Document> for Query {
    fn from(criteria: Document) -> Self {
        Query { criteria }
    }
}

/// An include-list of fields for backend reads. The identity field is always
/// included.
#[derive(Debug, Clone)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Projects only the named fields (plus the identity field).
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The projected field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}
