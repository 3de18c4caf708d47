//! Convenient re-exports of commonly used types from docmap.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docmap::prelude::*;
//! ```

pub use docmap_core::{
    backend::{
        DocumentStream, IndexOptions, StoreBackend, StoreBackendBuilder, UpdateOps, WriteAck,
    },
    collection::{Collection, InstanceStream, SaveOutcome},
    error::{MapperError, MapperResult},
    field::{Cardinality, FieldDescriptor, FieldKind, TypePredicate},
    id::{ID_FIELD, Id},
    instance::Instance,
    join::{Joined, Resolved},
    query::{Projection, Query},
    schema::{IndexSpec, Schema, SchemaBuilder},
    store::ModelStore,
    validate::validate,
};
