// src/pipeline.rs
// One batch run: normalize x3 -> unify -> (conditional) topic fit ->
// pure topic merge -> dedup + persist. Strictly sequential, single writer.

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{PipelineError, Stage};
use crate::normalize;
use crate::sentiment::SentimentAnalyzer;
use crate::store::{collections, DocumentStore};
use crate::topics::TopicModeler;
use crate::types::{RawHeadline, RawRedditPost, RawTweet, TopicAssignment, UnifiedRecord};
use crate::unify::unify;
use crate::writer;

/// One-time metrics registration (so series show up on the exporter side).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "etl_records_unified_total",
            "Unified records produced across runs."
        );
        describe_counter!(
            "etl_records_inserted_total",
            "Unified records written to the store."
        );
        describe_counter!(
            "etl_dedup_dropped_total",
            "Records dropped by intra-batch or cross-run dedup."
        );
        describe_counter!("etl_topic_fits_total", "Topic model fits performed.");
        describe_gauge!("etl_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Already-materialized raw batches, one per source. A failed or empty
/// acquisition source is an empty vector, decided once at the boundary
/// and threaded explicitly; stages never probe any ambient state.
#[derive(Debug, Default)]
pub struct RawBatches {
    pub reddit: Vec<RawRedditPost>,
    pub twitter: Vec<RawTweet>,
    pub news: Vec<RawHeadline>,
}

/// Per-stage counts for one run, for logging and assertions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub reddit_normalized: usize,
    pub twitter_normalized: usize,
    pub news_normalized: usize,
    pub unified: usize,
    pub corpus_size: usize,
    pub topics_fitted: bool,
    pub topics_discovered: usize,
    pub inserted: usize,
}

/// Pure merge of topic assignments onto unified records, keyed by the
/// record text. Records without an assignment keep their defaults; no
/// positional alignment is involved.
pub fn merge_topics(
    records: Vec<UnifiedRecord>,
    assignments: &[TopicAssignment],
) -> Vec<UnifiedRecord> {
    let by_text: HashMap<&str, &TopicAssignment> = assignments
        .iter()
        .map(|a| (a.text.as_str(), a))
        .collect();

    records
        .into_iter()
        .map(|mut r| {
            if let Some(a) = by_text.get(r.text.as_str()) {
                r.topic_id = a.topic_id;
                r.topic_confidence = a.topic_confidence;
                if !a.topic_keywords.is_empty() {
                    let top5 = &a.topic_keywords[..a.topic_keywords.len().min(5)];
                    r.topic_keywords = top5.join(",");
                }
            }
            r
        })
        .collect()
}

/// Run the enrichment pipeline once over the given raw batches.
///
/// Error contract: `Connectivity` aborts the run before any work;
/// `StageFailed` means the enrichment stage was abandoned (the unify
/// hard dependency); store write failures surface as `Store`. A corpus
/// below the topic threshold is a skip, not an error.
pub async fn run(
    store: &dyn DocumentStore,
    settings: &Settings,
    batches: RawBatches,
) -> Result<RunReport, PipelineError> {
    ensure_metrics_described();

    store.ping().await.map_err(PipelineError::Connectivity)?;

    let analyzer = SentimentAnalyzer::new();
    let reddit = normalize::reddit::normalize(&analyzer, batches.reddit);
    let twitter = normalize::twitter::normalize(&analyzer, batches.twitter);
    let news = normalize::news::normalize(&analyzer, batches.news);

    let mut report = RunReport {
        reddit_normalized: reddit.len(),
        twitter_normalized: twitter.len(),
        news_normalized: news.len(),
        ..Default::default()
    };

    // Hard dependency: reddit and news must be present for a meaningful
    // unified batch; twitter may legitimately be empty.
    if reddit.is_empty() || news.is_empty() {
        return Err(PipelineError::StageFailed {
            stage: Stage::Unify,
            reason: format!(
                "reddit ({}) and news ({}) batches must both be non-empty",
                reddit.len(),
                news.len()
            ),
        });
    }

    let records = unify(reddit, twitter, news);
    report.unified = records.len();
    counter!("etl_records_unified_total").increment(records.len() as u64);

    // Corpus = existing unified texts + this run's texts. A read failure
    // here degrades to an empty existing corpus rather than aborting.
    let existing_texts = match store.find_texts(collections::SENTIMENT_ANALYSIS).await {
        Ok(texts) => texts,
        Err(e) => {
            warn!(error = %e, "could not read existing corpus; continuing with new texts only");
            Vec::new()
        }
    };
    let new_texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
    let corpus: Vec<String> = existing_texts
        .into_iter()
        .chain(new_texts.iter().cloned())
        .collect();
    report.corpus_size = corpus.len();

    let (records, topics) = if corpus.len() >= settings.topics.min_corpus_size {
        let mut modeler = TopicModeler::new(&settings.topics);
        match modeler.fit(&corpus) {
            Ok(()) => {
                counter!("etl_topic_fits_total").increment(1);
                let assignments = modeler.transform(&new_texts);
                let merged = merge_topics(records, &assignments);
                (merged, modeler.topics(Utc::now()))
            }
            Err(e) => {
                // Degrade: records keep their unassigned defaults.
                warn!(error = %e, "topic fit failed; keeping default topic fields");
                (records, Vec::new())
            }
        }
    } else {
        info!(
            corpus = corpus.len(),
            threshold = settings.topics.min_corpus_size,
            "corpus below threshold; skipping topic fit"
        );
        (records, Vec::new())
    };
    report.topics_fitted = !topics.is_empty();
    report.topics_discovered = topics.len();

    report.inserted = writer::persist(store, &records).await?;
    writer::persist_topics(store, &topics).await?;

    gauge!("etl_last_run_ts").set(Utc::now().timestamp().max(0) as f64);
    info!(
        unified = report.unified,
        inserted = report.inserted,
        topics_fitted = report.topics_fitted,
        "pipeline run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Source, TOPIC_KEYWORDS_DEFAULT, TOPIC_UNASSIGNED};
    use chrono::Utc;

    fn record(text: &str) -> UnifiedRecord {
        let now = Utc::now();
        UnifiedRecord {
            source: Source::News,
            source_id: text.to_string(),
            text: text.to_string(),
            created_at: now,
            sentiment_compound: 0.0,
            sentiment_positive: 0.0,
            sentiment_neutral: 1.0,
            sentiment_negative: 0.0,
            processed_at: now,
            topic_id: TOPIC_UNASSIGNED,
            topic_confidence: 0.0,
            topic_keywords: TOPIC_KEYWORDS_DEFAULT.to_string(),
        }
    }

    #[test]
    fn merge_is_keyed_by_text_not_position() {
        let records = vec![record("b"), record("a")];
        let assignments = vec![
            TopicAssignment {
                text: "a".into(),
                topic_id: 3,
                topic_confidence: 0.9,
                topic_keywords: vec!["x".into(), "y".into()],
            },
            TopicAssignment {
                text: "b".into(),
                topic_id: 1,
                topic_confidence: 0.8,
                topic_keywords: vec!["k1".into(), "k2".into(), "k3".into(), "k4".into(), "k5".into(), "k6".into()],
            },
        ];
        let merged = merge_topics(records, &assignments);
        assert_eq!(merged[0].topic_id, 1);
        assert_eq!(merged[0].topic_keywords, "k1,k2,k3,k4,k5");
        assert_eq!(merged[1].topic_id, 3);
        assert_eq!(merged[1].topic_keywords, "x,y");
    }

    #[test]
    fn merge_leaves_unassigned_records_at_defaults() {
        let merged = merge_topics(vec![record("solo")], &[]);
        assert_eq!(merged[0].topic_id, TOPIC_UNASSIGNED);
        assert_eq!(merged[0].topic_keywords, TOPIC_KEYWORDS_DEFAULT);
    }
}
