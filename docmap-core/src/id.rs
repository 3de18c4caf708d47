//! Opaque document identities.
//!
//! Every stored document carries its identity in the reserved [`ID_FIELD`]
//! field. Identities are opaque, comparable strings: callers may assign their
//! own, or leave assignment to the backend's identity generator at insert
//! time.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of the reserved field holding a document's identity.
pub const ID_FIELD: &str = "_id";

/// An opaque document identifier.
///
/// Wraps the identity's string form. Comparable, hashable, and serializable;
/// no structure beyond that is guaranteed, so callers must not parse it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Returns the identity's string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads an identity out of a BSON value, if it holds one.
    pub fn from_bson(value: &Bson) -> Option<Id> {
        match value {
            Bson::String(s) => Some(Id(s.clone())),
            _ => None,
        }
    }

    /// Reads a raw document's identity from its reserved field.
    pub fn from_document(document: &Document) -> Option<Id> {
        document.get(ID_FIELD).and_then(Id::from_bson)
    }

    /// Converts this identity to its stored BSON representation.
    pub fn to_bson(&self) -> Bson {
        Bson::String(self.0.clone())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id(value.to_string())
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Id(value.to_string())
    }
}

impl From<Id> for Bson {
    fn from(value: Id) -> Self {
        Bson::String(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn reads_identity_from_reserved_field() {
        let doc = doc! { "_id": "abc", "name": "x" };
        assert_eq!(Id::from_document(&doc), Some(Id::from("abc")));
    }

    #[test]
    fn rejects_non_string_identity() {
        assert_eq!(Id::from_bson(&Bson::Int32(1)), None);
        assert_eq!(Id::from_document(&doc! { "name": "x" }), None);
    }
}
