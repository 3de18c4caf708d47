//! In-memory model instances and their change tracking.
//!
//! An [`Instance`] pairs a schema handle with the document's current values
//! and a record of which fields changed since the last persistence. New
//! instances (never saved) write mutations straight into their values — the
//! whole document is inserted on first save. Persisted instances additionally
//! record every mutation in a pending-changes map, which [`Instance::delta`]
//! turns into the minimal set of fields a partial update must touch.
//!
//! Instances are not safe for concurrent mutation from multiple call sites;
//! the tracker assumes single-writer-at-a-time access, which the `&mut self`
//! mutation surface already enforces within safe Rust.

use bson::{Bson, Document};
use std::sync::Arc;

use crate::{
    id::{ID_FIELD, Id},
    schema::Schema,
};

/// One in-memory document bound to its schema.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    values: Document,
    pending: Document,
    is_new: bool,
}

impl Instance {
    /// Creates a fresh, unsaved instance from initial values. A caller-
    /// supplied identity in the values is honored; otherwise identity is
    /// assigned by the backend at insert time.
    pub(crate) fn new(schema: Arc<Schema>, values: Document) -> Self {
        Self {
            schema,
            values,
            pending: Document::new(),
            is_new: true,
        }
    }

    /// Rehydrates an instance from a stored raw document. The instance starts
    /// clean: not new, nothing pending.
    pub(crate) fn hydrate(schema: Arc<Schema>, raw: Document) -> Self {
        Self {
            schema,
            values: raw,
            pending: Document::new(),
            is_new: false,
        }
    }

    /// The schema this instance is bound to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The instance's identity, if one has been assigned yet.
    pub fn id(&self) -> Option<Id> {
        Id::from_document(&self.values)
    }

    /// Whether this instance has never been persisted.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Reads a field's current value.
    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.values.get(field)
    }

    /// Writes a field's value, recording it as pending when the instance is
    /// already persisted. Identity is immutable after persistence, so the
    /// reserved identity field is never tracked.
    pub fn set(&mut self, field: &str, value: impl Into<Bson>) {
        let value = value.into();
        if !self.is_new && field != ID_FIELD {
            self.pending.insert(field, value.clone());
        }
        self.values.insert(field, value);
    }

    /// The document's full current values.
    pub fn values(&self) -> &Document {
        &self.values
    }

    /// The fields mutated since the last persistence. Always a subset of the
    /// current values' keys; empty on a new instance.
    pub fn pending(&self) -> &Document {
        &self.pending
    }

    /// Whether any field changed since the last persistence.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The fields a save must write: the pending changes for a persisted
    /// instance, the full values for a new one.
    pub fn delta(&self) -> Document {
        if self.is_new {
            self.values.clone()
        } else {
            self.pending.clone()
        }
    }

    /// Records a successful first persistence under `id`.
    pub(crate) fn mark_saved(&mut self, id: Id) {
        self.values.insert(ID_FIELD, id);
        self.pending.clear();
        self.is_new = false;
    }

    /// Discards tracked changes after they have been written out.
    pub(crate) fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use bson::doc;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder("items")
                .field("name", FieldKind::string())
                .field("count", FieldKind::number())
                .build(),
        )
    }

    #[test]
    fn new_instance_mutates_without_tracking() {
        let mut instance = Instance::new(schema(), doc! { "name": "a" });
        instance.set("count", 3);

        assert!(instance.is_new());
        assert!(!instance.has_pending());
        assert_eq!(instance.delta(), doc! { "name": "a", "count": 3 });
    }

    #[test]
    fn persisted_instance_tracks_field_scoped_deltas() {
        let mut instance =
            Instance::hydrate(schema(), doc! { "_id": "1", "name": "a", "count": 3 });
        instance.set("name", "b");

        assert_eq!(instance.delta(), doc! { "name": "b" });
        assert_eq!(instance.get("count"), Some(&Bson::Int32(3)));

        // a second tracked field never disturbs the first
        instance.set("count", 4);
        assert_eq!(instance.delta(), doc! { "name": "b", "count": 4 });
    }

    #[test]
    fn identity_field_is_never_tracked() {
        let mut instance = Instance::hydrate(schema(), doc! { "_id": "1", "name": "a" });
        instance.set(ID_FIELD, "2");

        assert!(!instance.has_pending());
    }

    #[test]
    fn mark_saved_clears_tracking_state() {
        let mut instance = Instance::new(schema(), doc! { "name": "a" });
        instance.mark_saved(Id::from("assigned"));

        assert!(!instance.is_new());
        assert_eq!(instance.id(), Some(Id::from("assigned")));
        assert!(!instance.has_pending());

        instance.set("name", "b");
        assert_eq!(instance.delta(), doc! { "name": "b" });
        instance.clear_pending();
        assert!(!instance.has_pending());
    }
}
