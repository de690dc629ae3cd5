// src/store/memory.rs
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::{DedupKey, UnifiedRecord, TOPIC_UNASSIGNED};

/// In-memory document store for tests and dry runs. Collections are plain
/// JSON document lists, mirroring the schemaless store semantics.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    insert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert_many` calls made (empty batches must not write).
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Seed a collection directly, bypassing the insert counter.
    pub fn seed(&self, collection: &str, docs: Vec<serde_json::Value>) {
        let mut map = self.collections.lock().unwrap();
        map.entry(collection.to_string()).or_default().extend(docs);
    }

    pub fn docs(&self, collection: &str) -> Vec<serde_json::Value> {
        let map = self.collections.lock().unwrap();
        map.get(collection).cloned().unwrap_or_default()
    }
}

fn doc_dedup_key(doc: &serde_json::Value) -> Option<DedupKey> {
    serde_json::from_value::<DedupKey>(serde_json::json!({
        "source": doc.get("source")?,
        "source_id": doc.get("source_id")?,
    }))
    .ok()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let n = docs.len();
        let mut map = self.collections.lock().unwrap();
        map.entry(collection.to_string()).or_default().extend(docs);
        Ok(n)
    }

    async fn find_docs(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        Ok(self.docs(collection))
    }

    async fn find_texts(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .docs(collection)
            .iter()
            .filter_map(|d| d.get("text").and_then(|t| t.as_str()).map(str::to_string))
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self.docs(collection).len() as u64)
    }

    async fn known_dedup_keys(
        &self,
        collection: &str,
        keys: &[DedupKey],
    ) -> Result<HashSet<DedupKey>, StoreError> {
        let wanted: HashSet<&DedupKey> = keys.iter().collect();
        Ok(self
            .docs(collection)
            .iter()
            .filter_map(doc_dedup_key)
            .filter(|k| wanted.contains(k))
            .collect())
    }

    async fn find_unassigned(&self, collection: &str) -> Result<Vec<UnifiedRecord>, StoreError> {
        Ok(self
            .docs(collection)
            .into_iter()
            .filter_map(|d| serde_json::from_value::<UnifiedRecord>(d).ok())
            .filter(|r| r.topic_id == TOPIC_UNASSIGNED)
            .collect())
    }

    async fn update_topics(
        &self,
        collection: &str,
        records: &[UnifiedRecord],
    ) -> Result<usize, StoreError> {
        let by_key: HashMap<DedupKey, &UnifiedRecord> =
            records.iter().map(|r| (r.dedup_key(), r)).collect();

        let mut updated = 0usize;
        let mut map = self.collections.lock().unwrap();
        if let Some(docs) = map.get_mut(collection) {
            for doc in docs.iter_mut() {
                let Some(key) = doc_dedup_key(doc) else {
                    continue;
                };
                if let Some(r) = by_key.get(&key) {
                    doc["topic_id"] = serde_json::json!(r.topic_id);
                    doc["topic_confidence"] = serde_json::json!(r.topic_confidence);
                    doc["topic_keywords"] = serde_json::json!(r.topic_keywords);
                    updated += 1;
                }
            }
        }
        Ok(updated)
    }
}
