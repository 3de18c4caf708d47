//! In-memory storage backend for docmap.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! mapper's `StoreBackend` trait. It uses an async-aware read-write lock for
//! concurrent access and is the backend of choice for development, testing,
//! and small-scale deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use docmap::{memory::MemoryBackend, store::ModelStore, schema::Schema, field::FieldKind};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = ModelStore::new(MemoryBackend::new());
//!     store
//!         .register(
//!             Schema::builder("users")
//!                 .field("name", FieldKind::string())
//!                 .build(),
//!         )
//!         .await?;
//!
//!     let users = store.collection("users")?;
//!     let mut user = users.create(doc! { "name": "Alice" });
//!     users.save(&mut user).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmap_memory;

mod matcher;
pub mod store;

pub use store::{MemoryBackend, MemoryBackendBuilder};
