// src/writer.rs
// Deduplicating writer: last stage of the pipeline.

use metrics::counter;
use std::collections::HashSet;
use tracing::info;

use crate::error::{PipelineError, StoreError};
use crate::store::{collections, DocumentStore};
use crate::types::{Topic, UnifiedRecord};

/// Persist a unified batch, deduplicated two ways:
///
/// 1. intra-batch by (source, source_id), keeping the first occurrence;
/// 2. cross-run against keys already present in `sentiment_analysis`.
///
/// Returns the count actually written. An empty post-dedup batch performs
/// no write call and returns 0.
pub async fn persist(
    store: &dyn DocumentStore,
    records: &[UnifiedRecord],
) -> Result<usize, PipelineError> {
    let mut seen: HashSet<_> = HashSet::with_capacity(records.len());
    let mut batch: Vec<&UnifiedRecord> = Vec::with_capacity(records.len());
    for r in records {
        if seen.insert(r.dedup_key()) {
            batch.push(r);
        }
    }
    let intra_dropped = records.len() - batch.len();

    let keys: Vec<_> = batch.iter().map(|r| r.dedup_key()).collect();
    let known = store
        .known_dedup_keys(collections::SENTIMENT_ANALYSIS, &keys)
        .await?;
    let before_cross = batch.len();
    batch.retain(|r| !known.contains(&r.dedup_key()));
    let cross_dropped = before_cross - batch.len();

    counter!("etl_dedup_dropped_total").increment((intra_dropped + cross_dropped) as u64);
    if intra_dropped + cross_dropped > 0 {
        info!(
            intra = intra_dropped,
            cross = cross_dropped,
            "dropped duplicate unified records"
        );
    }

    if batch.is_empty() {
        return Ok(0);
    }

    let docs: Vec<serde_json::Value> = batch
        .iter()
        .map(|r| serde_json::to_value(r))
        .collect::<Result<_, _>>()
        .map_err(StoreError::Malformed)?;

    let inserted = store
        .insert_many(collections::SENTIMENT_ANALYSIS, docs)
        .await?;
    counter!("etl_records_inserted_total").increment(inserted as u64);
    info!(inserted, "persisted unified records");
    Ok(inserted)
}

/// Number of distinct topic ids in the `topics` collection. Each refit
/// appends a whole batch, so the raw document count inflates run over run
/// while the distinct id count stays at the fitted topic count.
pub async fn distinct_topic_count(store: &dyn DocumentStore) -> Result<usize, PipelineError> {
    let docs = store.find_docs(collections::TOPICS).await?;
    let ids: HashSet<i64> = docs
        .iter()
        .filter_map(|d| d.get("topic_id").and_then(|v| v.as_i64()))
        .collect();
    Ok(ids.len())
}

/// Persist the topics discovered by one fit. Appended, not versioned: a
/// refit's batch supersedes earlier semantics for the same topic ids.
pub async fn persist_topics(
    store: &dyn DocumentStore,
    topics: &[Topic],
) -> Result<usize, PipelineError> {
    if topics.is_empty() {
        return Ok(0);
    }
    let docs: Vec<serde_json::Value> = topics
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(StoreError::Malformed)?;
    let inserted = store.insert_many(collections::TOPICS, docs).await?;
    info!(inserted, "persisted topic batch");
    Ok(inserted)
}
