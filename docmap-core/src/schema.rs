//! Collection schemas and their builder.
//!
//! A [`Schema`] is the declarative definition of one backend collection: an
//! ordered table of [`FieldDescriptor`]s plus the index declarations the
//! collection should carry. Schemas are built once with [`Schema::builder`]
//! and immutable afterwards; field order is preserved so validation reports
//! failures deterministically.
//!
//! Reference and embedded fields name their target collection rather than
//! holding the target schema directly, so self-referencing and mutually
//! referencing schemas declare cleanly; targets resolve through the store's
//! registry when a join or cascading save actually needs them.
//!
//! # Example
//!
//! ```ignore
//! use docmap::{field::FieldKind, schema::Schema};
//!
//! let items = Schema::builder("items")
//!     .field("name", FieldKind::string())
//!     .list("tags", FieldKind::reference("tags"))
//!     .index("name", false)
//!     .build();
//! ```

use crate::field::{FieldDescriptor, FieldKind};

/// A declared index on one field of a collection.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    field: String,
    unique: bool,
}

impl IndexSpec {
    /// The indexed field's name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the index enforces uniqueness.
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

/// The immutable definition of one collection's documents.
#[derive(Debug, Clone)]
pub struct Schema {
    collection: String,
    fields: Vec<FieldDescriptor>,
    indexes: Vec<IndexSpec>,
}

impl Schema {
    /// Starts building a schema for the named backend collection.
    pub fn builder(collection: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            collection: collection.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// The backend collection this schema maps to.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// All field descriptors, in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// The reference and embedded fields, in declaration order.
    pub fn relation_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.is_relation())
    }

    /// The index declarations this collection carries.
    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }
}

/// Fluent builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    collection: String,
    fields: Vec<FieldDescriptor>,
    indexes: Vec<IndexSpec>,
}

impl SchemaBuilder {
    /// Declares a required single-valued field.
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.descriptor(FieldDescriptor::new(name, kind))
    }

    /// Declares a required list-valued field.
    pub fn list(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.descriptor(FieldDescriptor::list(name, kind))
    }

    /// Declares an optional single-valued field.
    pub fn optional(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.descriptor(FieldDescriptor::new(name, kind).optional())
    }

    /// Declares a fully specified field.
    pub fn descriptor(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Declares an index on `field`, created when the schema is registered.
    pub fn index(mut self, field: impl Into<String>, unique: bool) -> Self {
        self.indexes.push(IndexSpec { field: field.into(), unique });
        self
    }

    /// Finalizes the schema.
    pub fn build(self) -> Schema {
        Schema {
            collection: self.collection,
            fields: self.fields,
            indexes: self.indexes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Cardinality;

    #[test]
    fn builder_preserves_declaration_order() {
        let schema = Schema::builder("items")
            .field("name", FieldKind::string())
            .field("count", FieldKind::number())
            .list("tags", FieldKind::reference("tags"))
            .build();

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["name", "count", "tags"]);
        assert_eq!(schema.collection_name(), "items");
    }

    #[test]
    fn relation_fields_skips_primitives() {
        let schema = Schema::builder("items")
            .field("name", FieldKind::string())
            .field("owner", FieldKind::reference("users"))
            .field("address", FieldKind::embedded("addresses"))
            .build();

        let relations: Vec<&str> = schema.relation_fields().map(|f| f.name()).collect();
        assert_eq!(relations, vec!["owner", "address"]);
    }

    #[test]
    fn index_declarations_are_kept() {
        let schema = Schema::builder("items")
            .field("name", FieldKind::string())
            .index("name", true)
            .build();

        assert_eq!(schema.indexes().len(), 1);
        assert_eq!(schema.indexes()[0].field(), "name");
        assert!(schema.indexes()[0].is_unique());
    }

    #[test]
    fn field_lookup_by_name() {
        let schema = Schema::builder("items")
            .list("tags", FieldKind::reference("tags"))
            .build();

        let tags = schema.field("tags").unwrap();
        assert_eq!(tags.cardinality(), Cardinality::List);
        assert!(schema.field("missing").is_none());
    }
}
