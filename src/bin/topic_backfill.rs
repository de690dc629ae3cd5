//! Topic backfill job: assign topics to unified records persisted before
//! any model was fitted (topic_id still -1).
//!
//! Refits over the full existing corpus; the topic count follows the
//! number of already-persisted topics so ids stay comparable, falling
//! back to the configured default when none exist.

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use global_sentiment_etl::pipeline::merge_topics;
use global_sentiment_etl::store::{collections, http::HttpStore, DocumentStore};
use global_sentiment_etl::topics::TopicModeler;
use global_sentiment_etl::{config, init_tracing, writer, PipelineError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = config::load_default().context("loading settings")?;
    let store = HttpStore::new(&settings.store);
    store
        .ping()
        .await
        .map_err(PipelineError::Connectivity)
        .context("store connectivity check")?;

    let unassigned = store
        .find_unassigned(collections::SENTIMENT_ANALYSIS)
        .await
        .context("reading unassigned records")?;
    if unassigned.is_empty() {
        info!("no unassigned records; nothing to backfill");
        return Ok(());
    }
    info!(count = unassigned.len(), "found unassigned records");

    // The unassigned texts are already persisted, so the full existing
    // corpus covers them.
    let corpus = store
        .find_texts(collections::SENTIMENT_ANALYSIS)
        .await
        .context("reading existing corpus")?;
    if corpus.len() < settings.topics.min_corpus_size {
        info!(
            corpus = corpus.len(),
            threshold = settings.topics.min_corpus_size,
            "corpus below threshold; backfill skipped"
        );
        return Ok(());
    }

    // Refits append whole topic batches, so the raw document count grows
    // with every run; only the distinct id count matches the fitted topic
    // count and keeps ids comparable with the stored assignments.
    let stored_topics = writer::distinct_topic_count(&store).await.unwrap_or(0);
    let n_topics = if stored_topics > 0 {
        stored_topics
    } else {
        settings.topics.n_topics
    };

    let mut modeler = TopicModeler::new(&settings.topics).with_n_topics(n_topics);
    modeler
        .fit(&corpus)
        .context("fitting topic model for backfill")?;

    let texts: Vec<String> = unassigned.iter().map(|r| r.text.clone()).collect();
    let assignments = modeler.transform(&texts);
    let assigned = merge_topics(unassigned, &assignments);

    let updated = store
        .update_topics(collections::SENTIMENT_ANALYSIS, &assigned)
        .await
        .context("writing backfilled topic fields")?;
    writer::persist_topics(&store, &modeler.topics(Utc::now()))
        .await
        .context("persisting topic batch")?;

    info!(updated, "topic backfill complete");
    Ok(())
}
