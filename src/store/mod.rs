// src/store/mod.rs
pub mod http;
pub mod memory;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::StoreError;
use crate::types::{DedupKey, UnifiedRecord};

/// Collection names in the document store.
pub mod collections {
    /// Acquisition sinks, owned by the external extract jobs.
    pub const RAW_REDDIT_POSTS: &str = "raw_reddit_posts";
    pub const RAW_TWITTER_POSTS: &str = "raw_twitter_posts";
    pub const RAW_NEWS_ARTICLES: &str = "raw_news_articles";
    /// The unified-record store; this core's sole enriched write target.
    pub const SENTIMENT_ANALYSIS: &str = "sentiment_analysis";
    /// One document per topic per fit, appended on each refit.
    pub const TOPICS: &str = "topics";
}

/// Seam to the document store. The pipeline takes this as an explicit
/// value scoped to the run; there is no ambient global handle.
///
/// The store holds schemaless documents; reads that return typed records
/// deserialize leniently and skip documents that don't fit the shape.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Connectivity probe. Failure here is fatal for the whole run.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert documents, returning the count actually written.
    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError>;

    /// All documents of a collection (raw acquisition batches are small;
    /// this core treats them as already materialized).
    async fn find_docs(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError>;

    /// The `text` field of every document in a collection.
    async fn find_texts(&self, collection: &str) -> Result<Vec<String>, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Which of the given identity keys already exist in the collection.
    async fn known_dedup_keys(
        &self,
        collection: &str,
        keys: &[DedupKey],
    ) -> Result<HashSet<DedupKey>, StoreError>;

    /// Unified records still carrying the unassigned topic sentinel.
    async fn find_unassigned(&self, collection: &str) -> Result<Vec<UnifiedRecord>, StoreError>;

    /// Overwrite the topic fields of existing records, matched by
    /// (source, source_id). Returns the number of records updated.
    async fn update_topics(
        &self,
        collection: &str,
        records: &[UnifiedRecord],
    ) -> Result<usize, StoreError>;
}
