// tests/pipeline_e2e.rs
// Full run over the in-memory store: normalize -> unify -> topic fit ->
// merge -> dedup + persist, plus the skip and abort paths.

use chrono::{TimeZone, Utc};
use global_sentiment_etl::config::{Settings, StoreSettings, TopicSettings};
use global_sentiment_etl::error::Stage;
use global_sentiment_etl::pipeline::{run, RawBatches};
use global_sentiment_etl::store::{collections, memory::MemoryStore};
use global_sentiment_etl::types::{RawHeadline, RawRedditPost, TOPIC_UNASSIGNED};
use global_sentiment_etl::{writer, PipelineError};

fn settings() -> Settings {
    Settings {
        store: StoreSettings {
            endpoint: "http://localhost:8181".into(),
            database: "global_sentiment".into(),
            timeout_secs: 10,
        },
        topics: TopicSettings {
            n_topics: 3,
            min_corpus_size: 10,
            iterations: 150,
            ..Default::default()
        },
    }
}

fn reddit_post(id: &str, title: &str) -> RawRedditPost {
    RawRedditPost {
        id: id.into(),
        title: Some(title.into()),
        url: Some(format!("http://reddit.example/{id}")),
        created_utc: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ..Default::default()
    }
}

fn headline(n: usize, title: &str) -> RawHeadline {
    RawHeadline {
        title: Some(title.into()),
        url: Some(format!("http://news.example/{n}")),
        source: Some("bbc".into()),
        extracted_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()),
        ..Default::default()
    }
}

fn full_batches() -> RawBatches {
    RawBatches {
        reddit: vec![
            reddit_post("r1", "Central bank raises interest rates again"),
            reddit_post("r2", "Interest rates climb as inflation bites"),
            reddit_post("r3", "Bank signals further interest rate hikes"),
            reddit_post("r4", "Inflation pressures central bank policy"),
            reddit_post("r5", "Markets rally despite rate fears"),
            reddit_post("r6", "Investors weigh central bank guidance"),
        ],
        twitter: Vec::new(),
        news: vec![
            headline(1, "Storm warning issued for coastal regions"),
            headline(2, "Coastal towns brace for severe storm"),
            headline(3, "Severe storm floods coastal roads"),
            headline(4, "Storm damage closes coastal schools"),
            headline(5, "Championship final ends in penalty drama"),
            headline(6, "Team wins championship after penalty shootout"),
        ],
    }
}

#[tokio::test]
async fn full_run_unifies_fits_and_persists() {
    let store = MemoryStore::new();
    let s = settings();

    let report = run(&store, &s, full_batches()).await.unwrap();
    assert_eq!(report.reddit_normalized, 6);
    assert_eq!(report.twitter_normalized, 0);
    assert_eq!(report.news_normalized, 6);
    assert_eq!(report.unified, 12);
    assert_eq!(report.corpus_size, 12);
    assert!(report.topics_fitted);
    assert_eq!(report.topics_discovered, s.topics.n_topics);
    assert_eq!(report.inserted, 12);

    // Every persisted record carries a real topic assignment.
    let docs = store.docs(collections::SENTIMENT_ANALYSIS);
    assert_eq!(docs.len(), 12);
    for doc in &docs {
        let topic_id = doc["topic_id"].as_i64().unwrap();
        assert!(topic_id >= 0 && (topic_id as usize) < s.topics.n_topics);
        assert_ne!(doc["topic_keywords"], "Unknown");
    }
    assert_eq!(
        store.docs(collections::TOPICS).len(),
        s.topics.n_topics
    );
}

#[tokio::test]
async fn replayed_run_inserts_nothing() {
    let store = MemoryStore::new();
    let s = settings();

    let first = run(&store, &s, full_batches()).await.unwrap();
    assert_eq!(first.inserted, 12);

    let second = run(&store, &s, full_batches()).await.unwrap();
    assert_eq!(second.unified, 12);
    assert_eq!(second.inserted, 0);
    // Second run's corpus covers the already-persisted texts too.
    assert_eq!(second.corpus_size, 24);
    assert_eq!(store.docs(collections::SENTIMENT_ANALYSIS).len(), 12);
}

#[tokio::test]
async fn repeated_fits_do_not_inflate_the_distinct_topic_count() {
    let store = MemoryStore::new();
    let s = settings();

    run(&store, &s, full_batches()).await.unwrap();
    run(&store, &s, full_batches()).await.unwrap();

    // Two fits appended two whole batches to the topics collection...
    assert_eq!(
        store.docs(collections::TOPICS).len(),
        2 * s.topics.n_topics
    );
    // ...but the count the backfill job keys its topic count on stays at
    // the configured number of topics.
    assert_eq!(
        writer::distinct_topic_count(&store).await.unwrap(),
        s.topics.n_topics
    );
}

#[tokio::test]
async fn missing_reddit_batch_aborts_at_unify() {
    let store = MemoryStore::new();
    let batches = RawBatches {
        reddit: Vec::new(),
        ..full_batches()
    };
    let err = run(&store, &settings(), batches).await.unwrap_err();
    assert!(!err.is_fatal());
    match err {
        PipelineError::StageFailed { stage, .. } => assert_eq!(stage, Stage::Unify),
        other => panic!("expected StageFailed, got {other:?}"),
    }
    assert!(store.docs(collections::SENTIMENT_ANALYSIS).is_empty());
}

#[tokio::test]
async fn missing_news_batch_aborts_at_unify() {
    let store = MemoryStore::new();
    let batches = RawBatches {
        news: Vec::new(),
        ..full_batches()
    };
    let err = run(&store, &settings(), batches).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::StageFailed {
            stage: Stage::Unify,
            ..
        }
    ));
}

#[tokio::test]
async fn small_corpus_skips_the_topic_fit() {
    let store = MemoryStore::new();
    let s = settings();
    let batches = RawBatches {
        reddit: vec![reddit_post("r1", "Central bank raises interest rates")],
        twitter: Vec::new(),
        news: vec![headline(1, "Storm warning issued for coastal regions")],
    };

    let report = run(&store, &s, batches).await.unwrap();
    assert_eq!(report.unified, 2);
    assert!(!report.topics_fitted);
    assert_eq!(report.topics_discovered, 0);
    assert_eq!(report.inserted, 2);

    for doc in store.docs(collections::SENTIMENT_ANALYSIS) {
        assert_eq!(doc["topic_id"].as_i64().unwrap(), i64::from(TOPIC_UNASSIGNED));
        assert_eq!(doc["topic_keywords"], "Unknown");
    }
    assert!(store.docs(collections::TOPICS).is_empty());
}

#[tokio::test]
async fn twitter_may_be_empty_without_failing_the_run() {
    let store = MemoryStore::new();
    let report = run(&store, &settings(), full_batches()).await.unwrap();
    assert_eq!(report.twitter_normalized, 0);
    assert_eq!(report.inserted, 12);
}
