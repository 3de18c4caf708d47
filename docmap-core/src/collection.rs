//! Schema-scoped collection facades.
//!
//! A [`Collection`] binds one registered schema to the store and carries the
//! mapper's whole operational surface: creating and rehydrating instances,
//! counting and finding documents, the cascading save family
//! ([`save`](Collection::save), [`save_all`](Collection::save_all),
//! [`save_refs`](Collection::save_refs)), and reference resolution
//! ([`join`](Collection::join)).
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! let tags = store.collection("tags")?;
//! let mut tag = tags.create(doc! { "name": "urgent" });
//! tags.save(&mut tag).await?;
//!
//! let items = store.collection("items")?;
//! let mut item = items.create(doc! {
//!     "name": "first",
//!     "tags": [tag.id().unwrap().to_bson()],
//! });
//! items.save(&mut item).await?;
//!
//! let joined = items.join(&item).await?;
//! ```

use std::{collections::HashMap, sync::Arc};

use bson::{Bson, Document};
use futures::{StreamExt, stream::BoxStream};
use tracing::{debug, trace};

use crate::{
    backend::{StoreBackend, UpdateOps, WriteAck},
    error::{MapperError, MapperResult},
    field::{Cardinality, FieldDescriptor, FieldKind},
    id::{ID_FIELD, Id},
    instance::Instance,
    join::{Joined, Resolved},
    query::Query,
    schema::Schema,
    store::ModelStore,
    validate::validate,
};

/// A finite, lazily consumed sequence of rehydrated instances.
pub type InstanceStream = BoxStream<'static, MapperResult<Instance>>;

/// What a save did to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new document was inserted under the given identity.
    Inserted {
        /// The identity the document was stored under.
        id: Id,
    },
    /// A partial update was issued; the acknowledgement is the backend's,
    /// with no refetch implied.
    Updated(WriteAck),
}

impl SaveOutcome {
    /// The identity assigned by an insert, if this outcome was one.
    pub fn inserted_id(&self) -> Option<&Id> {
        match self {
            SaveOutcome::Inserted { id } => Some(id),
            SaveOutcome::Updated(_) => None,
        }
    }
}

/// A schema-scoped view onto one backend collection.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    schema: Arc<Schema>,
    store: &'a ModelStore<B>,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(schema: Arc<Schema>, store: &'a ModelStore<B>) -> Self {
        Self { schema, store }
    }

    /// The backend collection this facade is bound to.
    pub fn name(&self) -> &str {
        self.schema.collection_name()
    }

    /// The schema this facade is bound to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Builds a new, unsaved instance from initial values. A caller-supplied
    /// identity in `values` is kept; otherwise the backend assigns one at
    /// insert time.
    pub fn create(&self, values: Document) -> Instance {
        Instance::new(self.schema.clone(), values)
    }

    /// Counts the documents matching `query`.
    pub async fn count(&self, query: impl Into<Query>) -> MapperResult<u64> {
        self.store
            .backend()
            .count(self.name(), query.into())
            .await
    }

    /// Finds the documents matching `query` as a lazy stream of rehydrated
    /// instances. The stream is finite; restart it by reissuing the query.
    pub async fn find(&self, query: impl Into<Query>) -> MapperResult<InstanceStream> {
        let schema = self.schema.clone();
        let documents = self
            .store
            .backend()
            .find(self.name(), query.into(), None)
            .await?;

        Ok(documents
            .map(move |document| document.map(|raw| Instance::hydrate(schema.clone(), raw)))
            .boxed())
    }

    /// Finds one document matching `query`, rehydrated, or `None`.
    pub async fn find_one(&self, query: impl Into<Query>) -> MapperResult<Option<Instance>> {
        Ok(self
            .store
            .backend()
            .find_one(self.name(), query.into(), None)
            .await?
            .map(|raw| Instance::hydrate(self.schema.clone(), raw)))
    }

    /// Validates and persists one instance.
    ///
    /// A new instance is inserted whole; a persisted instance gets a single
    /// partial update carrying only its tracked delta. The delta is written
    /// blind — no refetch happens first, so unmodified fields are never
    /// touched and concurrent writes to them survive (last-write-wins per
    /// field, not per document).
    ///
    /// # Errors
    ///
    /// [`MapperError::Validation`] before any write when fields fail;
    /// [`MapperError::DuplicateIdentity`] when inserting an identity that
    /// already exists.
    pub async fn save(&self, instance: &mut Instance) -> MapperResult<SaveOutcome> {
        validate(instance)?;

        if instance.is_new() {
            let stored = self
                .store
                .backend()
                .insert(self.name(), instance.values().clone())
                .await?;
            let id = Id::from_document(&stored)
                .ok_or_else(|| MapperError::MissingIdentity(self.name().to_string()))?;
            instance.mark_saved(id.clone());
            debug!(collection = self.name(), id = %id, "inserted document");
            Ok(SaveOutcome::Inserted { id })
        } else {
            let id = instance
                .id()
                .ok_or_else(|| MapperError::MissingIdentity(self.name().to_string()))?;
            let delta = instance.delta();
            if delta.is_empty() {
                return Ok(SaveOutcome::Updated(WriteAck::default()));
            }

            let ack = self
                .store
                .backend()
                .update(self.name(), &id, UpdateOps::set(delta))
                .await?;
            instance.clear_pending();
            debug!(
                collection = self.name(),
                id = %id,
                modified = ack.modified,
                "applied partial update"
            );
            Ok(SaveOutcome::Updated(ack))
        }
    }

    /// Persists an instance together with the unsaved inline sub-documents
    /// its reference and embedded fields hold, children before parent.
    ///
    /// Inline sub-documents in reference fields are recursively saved into
    /// their own collections and collapse to their new identifiers before
    /// the parent is written, so a persisted reference field only ever holds
    /// identifiers. Inline sub-documents in embedded fields are validated
    /// against their own schema, assigned an identity, and stay in the
    /// parent's body — no separate write.
    ///
    /// The cascade stops at the first sub-document validation failure;
    /// sub-documents persisted earlier in the same call are not rolled back.
    /// There is no multi-document transaction underneath.
    pub async fn save_all(&self, instance: &mut Instance) -> MapperResult<SaveOutcome> {
        validate(instance)?;

        let relations: Vec<FieldDescriptor> = self.schema.relation_fields().cloned().collect();
        for field in &relations {
            let Some(value) = instance.get(field.name()).cloned() else {
                continue;
            };

            match field.cardinality() {
                Cardinality::Single => {
                    if let Some(replacement) = self.cascade(field, value).await? {
                        instance.set(field.name(), replacement);
                    }
                }
                Cardinality::List => {
                    let Bson::Array(items) = value else { continue };
                    let mut changed = false;
                    let mut collapsed = Vec::with_capacity(items.len());
                    for item in items {
                        match self.cascade(field, item.clone()).await? {
                            Some(replacement) => {
                                changed = true;
                                collapsed.push(replacement);
                            }
                            None => collapsed.push(item),
                        }
                    }
                    if changed {
                        instance.set(field.name(), Bson::Array(collapsed));
                    }
                }
            }
        }

        self.save(instance).await
    }

    /// Persists one relation field value ahead of its parent, returning the
    /// replacement value when the inline sub-document had to change.
    async fn cascade(&self, field: &FieldDescriptor, value: Bson) -> MapperResult<Option<Bson>> {
        // identifiers and primitives pass through untouched
        let Bson::Document(inline) = value else {
            return Ok(None);
        };

        match field.kind() {
            FieldKind::Reference(target) => {
                let collection = self.store.collection(target)?;
                let mut child = collection.create(inline);
                Box::pin(collection.save_all(&mut child)).await?;
                let id = child
                    .id()
                    .ok_or_else(|| MapperError::MissingIdentity(target.clone()))?;
                trace!(
                    collection = self.name(),
                    field = field.name(),
                    id = %id,
                    "collapsed inline reference to identifier"
                );
                Ok(Some(id.to_bson()))
            }
            FieldKind::Embedded(target) => {
                let target_schema = self.store.schema(target)?.clone();
                let mut body = inline;
                let assigned = if Id::from_document(&body).is_none() {
                    body.insert(ID_FIELD, self.store.backend().new_id());
                    true
                } else {
                    false
                };
                // an embedding may attach to a sub-document that was never
                // saved on its own, so its schema is enforced here rather
                // than at validate time
                validate(&Instance::new(target_schema, body.clone()))?;
                Ok(assigned.then(|| Bson::Document(body)))
            }
            FieldKind::Primitive(_) => Ok(None),
        }
    }

    /// Resolves the instance's reference and embedded fields one level deep,
    /// returning the hydrated graph.
    ///
    /// Reference fields are fetched by identity from their target
    /// collections; fetches are deduplicated per call through an id-keyed
    /// cache, which also bounds traversal over cyclic schemas. Embedded
    /// fields wrap their inline body without touching the backend. List
    /// fields resolve per element with order preserved, and a single
    /// unresolved element fails the whole join — no partial graphs.
    ///
    /// Read-only: deeper chains require repeated joins by the caller.
    ///
    /// # Errors
    ///
    /// [`MapperError::ReferenceNotFound`] when a non-null identifier resolves
    /// to no document.
    pub async fn join(&self, instance: &Instance) -> MapperResult<Joined> {
        let mut fetched: HashMap<(String, Id), Instance> = HashMap::new();
        let mut resolved = Vec::new();

        for field in self.schema.relation_fields() {
            let Some(value) = instance.get(field.name()) else {
                continue;
            };
            if matches!(value, Bson::Null) {
                continue;
            }

            let entry = match field.cardinality() {
                Cardinality::Single => {
                    Resolved::One(self.resolve(field, value, &mut fetched).await?)
                }
                Cardinality::List => {
                    let Bson::Array(items) = value else {
                        return Err(MapperError::Serialization(format!(
                            "list field {} does not hold an array",
                            field.name()
                        )));
                    };
                    let mut targets = Vec::with_capacity(items.len());
                    for item in items {
                        targets.push(self.resolve(field, item, &mut fetched).await?);
                    }
                    Resolved::Many(targets)
                }
            };
            resolved.push((field.name().to_string(), entry));
        }

        Ok(Joined::new(instance.clone(), resolved))
    }

    /// Resolves one relation value into an instance of the target schema.
    async fn resolve(
        &self,
        field: &FieldDescriptor,
        value: &Bson,
        fetched: &mut HashMap<(String, Id), Instance>,
    ) -> MapperResult<Instance> {
        match (field.kind(), value) {
            (FieldKind::Embedded(target), Bson::Document(body)) => Ok(Instance::hydrate(
                self.store.schema(target)?.clone(),
                body.clone(),
            )),
            // an inline sub-document that no cascading save has collapsed yet
            (FieldKind::Reference(target), Bson::Document(body)) => Ok(Instance::new(
                self.store.schema(target)?.clone(),
                body.clone(),
            )),
            (FieldKind::Reference(target), Bson::String(raw)) => {
                let id = Id::from(raw.as_str());
                let key = (target.clone(), id.clone());
                if let Some(hit) = fetched.get(&key) {
                    return Ok(hit.clone());
                }

                let collection = self.store.collection(target)?;
                match collection.find_one(Query::by_id(&id)).await? {
                    Some(target_instance) => {
                        trace!(collection = target.as_str(), id = %id, "resolved reference");
                        fetched.insert(key, target_instance.clone());
                        Ok(target_instance)
                    }
                    None => Err(MapperError::ReferenceNotFound {
                        field: field.name().to_string(),
                        id,
                    }),
                }
            }
            (_, other) => Err(MapperError::Serialization(format!(
                "field {} holds an unresolvable value: {}",
                field.name(),
                other
            ))),
        }
    }

    /// Pushes edits made on a resolved graph back into the collections they
    /// belong to.
    ///
    /// Every resolved reference target with tracked changes (or added to the
    /// graph unsaved) is saved into its own collection; untouched targets are
    /// skipped entirely, so a join followed by an immediate `save_refs`
    /// issues zero writes. Mutated embedded sub-instances fold back into the
    /// owning field's inline body, and the root is re-saved once if it has
    /// anything pending.
    pub async fn save_refs(&self, joined: &mut Joined) -> MapperResult<()> {
        let (root, resolved) = joined.parts_mut();

        for (field_name, entry) in resolved.iter_mut() {
            let Some(field) = self.schema.field(field_name) else {
                continue;
            };

            match field.kind() {
                FieldKind::Reference(target) => {
                    let collection = self.store.collection(target)?;
                    for sub in entry.instances_mut() {
                        if sub.is_new() || sub.has_pending() {
                            collection.save(sub).await?;
                        }
                    }
                }
                FieldKind::Embedded(_) => match entry {
                    Resolved::One(sub) => {
                        if sub.has_pending() {
                            root.set(field_name, Bson::Document(sub.values().clone()));
                            sub.clear_pending();
                        }
                    }
                    Resolved::Many(subs) => {
                        if subs.iter().any(|sub| sub.has_pending()) {
                            let bodies = subs
                                .iter()
                                .map(|sub| Bson::Document(sub.values().clone()))
                                .collect::<Vec<_>>();
                            root.set(field_name, Bson::Array(bodies));
                            for sub in subs.iter_mut() {
                                sub.clear_pending();
                            }
                        }
                    }
                },
                FieldKind::Primitive(_) => {}
            }
        }

        if root.has_pending() {
            self.save(root).await?;
        }

        Ok(())
    }

    /// Deletes the instance's stored document, returning the number removed.
    pub async fn delete(&self, instance: &Instance) -> MapperResult<u64> {
        let id = instance
            .id()
            .ok_or_else(|| MapperError::MissingIdentity(self.name().to_string()))?;
        let removed = self
            .store
            .backend()
            .delete_one(self.name(), Query::by_id(&id))
            .await?;
        debug!(collection = self.name(), id = %id, removed, "deleted document");
        Ok(removed)
    }

    /// Deletes every document matching `query`, returning the number removed.
    pub async fn delete_many(&self, query: impl Into<Query>) -> MapperResult<u64> {
        self.store
            .backend()
            .delete_many(self.name(), query.into())
            .await
    }
}
