//! In-process document store.
//!
//! Records are kept per collection in insertion order, which is the store-native order
//! reported by `find`.

use super::{Collection, DocumentStore, FindOptions, StoreError, StoreResult, StoreStatus};
use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `collection`.
    pub async fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn matches_filter(record: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: Collection, record: Document) -> StoreResult<ObjectId> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();

        let id = match record.get("_id") {
            None => ObjectId::new(),
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => {
                return Err(StoreError::Write(format!(
                    "_id must be an ObjectId, got {}",
                    other
                )))
            }
        };

        if records
            .iter()
            .any(|r| r.get_object_id("_id").ok() == Some(id))
        {
            return Err(StoreError::Write(format!(
                "duplicate key in collection '{}': _id {}",
                collection, id
            )));
        }

        let mut stored = Document::new();
        stored.insert("_id", id);
        for (key, value) in record {
            if key != "_id" {
                stored.insert(key, value);
            }
        }
        records.push(stored);

        Ok(id)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let matching = records.iter().filter(|r| matches_filter(r, &filter)).cloned();
        Ok(match options.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn status(&self) -> StoreStatus {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections
            .keys()
            .map(|c| c.name().to_string())
            .collect();
        names.sort();

        StoreStatus {
            connected: true,
            collections: names,
            ..StoreStatus::disconnected("memory", None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_insert_generates_id_and_preserves_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert(Collection::Section, doc! {"title": "Intro", "order": 1_i64})
            .await
            .unwrap();

        let found = store
            .find(Collection::Section, doc! {}, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_object_id("_id").unwrap(), id);
        assert_eq!(found[0].get_str("title").unwrap(), "Intro");
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order_and_filters() {
        let store = MemoryStore::new();
        let section_a = ObjectId::new();
        let section_b = ObjectId::new();
        for (title, section) in [("a1", section_a), ("b1", section_b), ("a2", section_a)] {
            store
                .insert(Collection::Doc, doc! {"title": title, "section_id": section})
                .await
                .unwrap();
        }

        let all = store
            .find(Collection::Doc, doc! {}, FindOptions::default())
            .await
            .unwrap();
        let titles: Vec<&str> = all.iter().map(|d| d.get_str("title").unwrap()).collect();
        assert_eq!(titles, vec!["a1", "b1", "a2"]);

        let only_a = store
            .find(
                Collection::Doc,
                doc! {"section_id": section_a},
                FindOptions::default(),
            )
            .await
            .unwrap();
        let titles: Vec<&str> = only_a.iter().map(|d| d.get_str("title").unwrap()).collect();
        assert_eq!(titles, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_find_respects_limit_and_find_one() {
        let store = MemoryStore::new();
        for n in 0..5_i32 {
            store
                .insert(Collection::Section, doc! {"n": n})
                .await
                .unwrap();
        }

        let limited = store
            .find(Collection::Section, doc! {}, FindOptions::limit(2))
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let one = store
            .find_one(Collection::Section, doc! {"n": 3_i32})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(one.get_i32("n").unwrap(), 3);

        let none = store
            .find_one(Collection::Section, doc! {"n": 99_i32})
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Section, doc! {"title": "s"})
            .await
            .unwrap();

        assert_eq!(store.count(Collection::Section).await, 1);
        assert_eq!(store.count(Collection::Doc).await, 0);
        let docs = store
            .find(Collection::Doc, doc! {}, FindOptions::default())
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        store
            .insert(Collection::Section, doc! {"_id": id, "title": "first"})
            .await
            .unwrap();

        let second = store
            .insert(Collection::Section, doc! {"_id": id, "title": "second"})
            .await;
        assert!(matches!(second, Err(StoreError::Write(_))));
        assert_eq!(store.count(Collection::Section).await, 1);
    }

    #[tokio::test]
    async fn test_status_lists_collections() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Doc, doc! {"title": "d"})
            .await
            .unwrap();
        store
            .insert(Collection::Section, doc! {"title": "s"})
            .await
            .unwrap();

        let status = store.status().await;
        assert!(status.connected);
        assert_eq!(status.collections, vec!["doc", "section"]);
        assert!(status.error.is_none());
    }
}
