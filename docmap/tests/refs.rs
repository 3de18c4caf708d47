//! Reference fields: joins, cascading saves, and pushing edits back.

use bson::{Bson, doc};
use docmap::{memory::MemoryBackend, prelude::*};
use futures::TryStreamExt;

async fn store_with(schemas: Vec<Schema>) -> ModelStore<MemoryBackend> {
    let mut store = ModelStore::new(MemoryBackend::new());
    for schema in schemas {
        store.register(schema).await.unwrap();
    }
    store
}

fn tag_schema() -> Schema {
    Schema::builder("tags")
        .field("name", FieldKind::string())
        .build()
}

fn item_schema() -> Schema {
    Schema::builder("items")
        .field("name", FieldKind::string())
        .list("tags", FieldKind::reference("tags"))
        .build()
}

#[tokio::test]
async fn referenced_documents_hydrate_in_stored_order() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut first = tags.create(doc! { "name": "a" });
    let mut second = tags.create(doc! { "name": "b" });
    tags.save(&mut first).await.unwrap();
    tags.save(&mut second).await.unwrap();

    let mut item = items.create(doc! {
        "name": "zero",
        "tags": [first.id().unwrap().to_bson(), second.id().unwrap().to_bson()],
    });
    items.save(&mut item).await.unwrap();

    let found: Vec<Instance> = items
        .find(Query::new())
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].get("tags"),
        Some(&Bson::Array(vec![
            first.id().unwrap().to_bson(),
            second.id().unwrap().to_bson(),
        ]))
    );

    let joined = items.join(&found[0]).await.unwrap();
    let resolved = joined.resolved("tags").unwrap().many().unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].get("name"), Some(&Bson::String("a".into())));
    assert_eq!(resolved[1].get("name"), Some(&Bson::String("b".into())));
}

#[tokio::test]
async fn a_dangling_reference_fails_the_whole_join() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut tag = tags.create(doc! { "_id": "t1", "name": "a" });
    tags.save(&mut tag).await.unwrap();

    let mut item = items.create(doc! {
        "name": "zero",
        "tags": ["t1", "missing"],
    });
    items.save(&mut item).await.unwrap();

    let err = items.join(&item).await.unwrap_err();
    assert!(matches!(
        err,
        MapperError::ReferenceNotFound { field, id } if field == "tags" && id == Id::from("missing")
    ));
}

#[tokio::test]
async fn updates_keep_working_through_find_and_join_cycles() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut tag = tags.create(doc! { "_id": "t0", "name": "hello" });
    tags.save(&mut tag).await.unwrap();

    let mut item = items.create(doc! { "_id": "i0", "name": "zzz", "tags": ["t0"] });
    items.save(&mut item).await.unwrap();

    let mut fetched = items.find_one(Query::by_id(&Id::from("i0"))).await.unwrap().unwrap();
    fetched.set("name", "yyy");
    items.save(&mut fetched).await.unwrap();

    let fetched = items.find_one(Query::by_id(&Id::from("i0"))).await.unwrap().unwrap();
    assert_eq!(fetched.get("name"), Some(&Bson::String("yyy".into())));

    // the root of a joined graph saves like any other instance
    let mut joined = items.join(&fetched).await.unwrap();
    joined.instance_mut().set("name", "xxx");
    items.save(joined.instance_mut()).await.unwrap();

    let fetched = items.find_one(Query::by_id(&Id::from("i0"))).await.unwrap().unwrap();
    assert_eq!(fetched.get("name"), Some(&Bson::String("xxx".into())));
}

#[tokio::test]
async fn save_refs_writes_back_mutated_targets_only() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut a = tags.create(doc! { "_id": "ta", "name": "a" });
    let mut b = tags.create(doc! { "_id": "tb", "name": "b" });
    tags.save(&mut a).await.unwrap();
    tags.save(&mut b).await.unwrap();

    let mut item = items.create(doc! { "name": "zero", "tags": ["ta", "tb"] });
    items.save(&mut item).await.unwrap();

    // an untouched graph issues no writes: an external edit made between the
    // join and save_refs survives
    let mut joined_untouched = items.join(&item).await.unwrap();
    let mut external = tags.find_one(Query::by_id(&Id::from("tb"))).await.unwrap().unwrap();
    external.set("name", "external");
    tags.save(&mut external).await.unwrap();
    items.save_refs(&mut joined_untouched).await.unwrap();

    let stored = tags.find_one(Query::by_id(&Id::from("tb"))).await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&Bson::String("external".into())));

    // a mutated target is written back into its own collection
    let mut joined = items.join(&item).await.unwrap();
    joined
        .resolved_mut("tags")
        .unwrap()
        .many_mut()
        .unwrap()[0]
        .set("name", "z");
    items.save_refs(&mut joined).await.unwrap();

    let stored = tags.find_one(Query::by_id(&Id::from("ta"))).await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&Bson::String("z".into())));
}

#[tokio::test]
async fn unsaved_targets_added_after_a_join_are_inserted_by_save_refs() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut tag = tags.create(doc! { "_id": "t0", "name": "a" });
    tags.save(&mut tag).await.unwrap();

    let mut item = items.create(doc! { "name": "zero", "tags": ["t0"] });
    items.save(&mut item).await.unwrap();

    let mut joined = items.join(&item).await.unwrap();
    joined
        .resolved_mut("tags")
        .unwrap()
        .many_mut()
        .unwrap()
        .push(tags.create(doc! { "_id": "t1", "name": "d" }));
    items.save_refs(&mut joined).await.unwrap();

    assert_eq!(tags.count(Query::new()).await.unwrap(), 2);
    let stored = tags.find_one(Query::by_id(&Id::from("t1"))).await.unwrap().unwrap();
    assert_eq!(stored.values(), &doc! { "_id": "t1", "name": "d" });
}

#[tokio::test]
async fn save_all_collapses_inline_references_to_identifiers() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut tag = tags.create(doc! { "_id": "t4", "name": "e" });
    tags.save(&mut tag).await.unwrap();

    // a mix of an already-saved identifier and an inline sub-document
    let mut item = items.create(doc! {
        "name": "three",
        "tags": ["t4", { "_id": "t5", "name": "f" }],
    });
    items.save_all(&mut item).await.unwrap();

    assert_eq!(tags.count(Query::new()).await.unwrap(), 2);
    assert_eq!(items.count(Query::new()).await.unwrap(), 1);

    let stored = items.find_one(doc! { "name": "three" }).await.unwrap().unwrap();
    assert_eq!(
        stored.get("tags"),
        Some(&Bson::Array(vec![
            Bson::String("t4".into()),
            Bson::String("t5".into()),
        ]))
    );
    let inserted = tags.find_one(Query::by_id(&Id::from("t5"))).await.unwrap().unwrap();
    assert_eq!(inserted.values(), &doc! { "_id": "t5", "name": "f" });
}

#[tokio::test]
async fn save_all_stops_at_the_first_invalid_sibling_without_rollback() {
    let store = store_with(vec![tag_schema(), item_schema()]).await;
    let tags = store.collection("tags").unwrap();
    let items = store.collection("items").unwrap();

    let mut item = items.create(doc! {
        "name": "broken",
        "tags": [
            { "_id": "ok", "name": "fine" },
            { "_id": "bad", "name": 42 },
        ],
    });
    let err = items.save_all(&mut item).await.unwrap_err();
    assert!(err.failing_fields().is_some());

    // the earlier sibling stays persisted; the parent was never written
    assert_eq!(tags.count(Query::new()).await.unwrap(), 1);
    assert_eq!(items.count(Query::new()).await.unwrap(), 0);
}
