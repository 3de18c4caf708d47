//! A schema-driven document-object mapper over pluggable document stores.
//!
//! This crate is the core of the docmap project and provides:
//!
//! - **Field descriptors and schemas** ([`field`], [`schema`]) - Declarative
//!   definitions of a collection's fields, constraints, and relations
//! - **Model instances** ([`instance`]) - In-memory documents with
//!   partial-update change tracking
//! - **Validation** ([`validate`]) - Pure, all-failures-at-once checking of
//!   instance values against their schema
//! - **Reference resolution** ([`join`], [`collection`]) - Hydration of
//!   by-identity references and inline embeds into a resolved graph
//! - **Cascading persistence** ([`collection`]) - `save`, `save_all`, and
//!   `save_refs` over an object graph backed by a flat document store
//! - **Store backend abstraction** ([`backend`]) - The trait concrete
//!   storage drivers implement
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docmap_core::{field::FieldKind, schema::Schema, store::ModelStore};
//! use bson::doc;
//!
//! let mut store = ModelStore::new(backend);
//! store
//!     .register(
//!         Schema::builder("tags")
//!             .field("name", FieldKind::string())
//!             .build(),
//!     )
//!     .await?;
//!
//! let tags = store.collection("tags")?;
//! let mut tag = tags.create(doc! { "name": "urgent" });
//! tags.save(&mut tag).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmap_core;

pub mod backend;
pub mod collection;
pub mod error;
pub mod field;
pub mod id;
pub mod instance;
pub mod join;
pub mod query;
pub mod schema;
pub mod store;
pub mod validate;
