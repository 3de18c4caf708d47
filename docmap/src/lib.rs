//! Main docmap crate providing a unified interface for document-object
//! mapping.
//!
//! This crate is the primary entry point for users of the docmap framework.
//! It re-exports the core types from the sub-crates and provides convenient
//! access to the bundled storage backend.
//!
//! # Features
//!
//! - **Declarative schemas** - Describe each collection's fields, constraints,
//!   references, and embeds once; validate every save against them
//! - **Change tracking** - Persisted instances record field-level deltas and
//!   saves write only what changed
//! - **Joins** - Resolve by-identity references and inline embeds into a
//!   hydrated graph on demand
//! - **Cascading saves** - `save_all` persists an object graph children-first;
//!   `save_refs` pushes post-join edits back where they belong
//!
//! # Quick Start
//!
//! ```ignore
//! use docmap::{prelude::*, memory::MemoryBackend};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = ModelStore::new(MemoryBackend::new());
//!
//!     store
//!         .register(
//!             Schema::builder("tags")
//!                 .field("name", FieldKind::string())
//!                 .build(),
//!         )
//!         .await?;
//!     store
//!         .register(
//!             Schema::builder("items")
//!                 .field("name", FieldKind::string())
//!                 .list("tags", FieldKind::reference("tags"))
//!                 .build(),
//!         )
//!         .await?;
//!
//!     // save a tag, then an item referencing it by identity
//!     let tags = store.collection("tags")?;
//!     let mut urgent = tags.create(doc! { "name": "urgent" });
//!     tags.save(&mut urgent).await?;
//!
//!     let items = store.collection("items")?;
//!     let mut item = items.create(doc! {
//!         "name": "first",
//!         "tags": [urgent.id().unwrap().to_bson()],
//!     });
//!     items.save(&mut item).await?;
//!
//!     // hydrate the reference, edit it, push the edit back
//!     let mut joined = items.join(&item).await?;
//!     if let Some(tag) = joined.resolved_mut("tags").and_then(|r| r.many_mut()) {
//!         tag[0].set("name", "very urgent");
//!     }
//!     items.save_refs(&mut joined).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Partial updates
//!
//! Saving a persisted instance issues a single field-level partial update
//! carrying only the tracked delta — the mapper never refetches before
//! writing. Unmodified fields are untouched regardless of concurrent external
//! modification: last-write-wins applies per field, not per document. A
//! second `save` issued before the first resolves races against it; the
//! mapper does not queue concurrent saves on one instance.
//!
//! # Cascades and atomicity
//!
//! `save_all` persists children before parents so reference fields always
//! collapse to valid identifiers, but there is no multi-document transaction
//! underneath: when a later sibling fails validation, siblings persisted
//! earlier in the same call stay persisted.
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing; any
//!   store implementing `StoreBackend` plugs in the same way

pub mod prelude;

pub use docmap_core::{
    backend, collection, error, field, id, instance, join, query, schema, store, validate,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docmap_memory::{MemoryBackend, MemoryBackendBuilder};
}
