//! Batch ETL entrypoint: read the materialized raw batches, run the
//! enrichment pipeline once, and exit.
//!
//! Acquisition (scraping, provider APIs) is a separate job that fills the
//! raw_* collections; this binary only consumes them.

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use global_sentiment_etl::pipeline::{self, RawBatches};
use global_sentiment_etl::store::{collections, http::HttpStore, DocumentStore};
use global_sentiment_etl::{config, init_tracing, PipelineError};

/// Read one raw collection, degrading to an empty batch on any failure.
/// Partial-source failure is non-fatal: downstream stages tolerate 0, 1
/// or 2 empty sources.
async fn read_raw_batch<T: DeserializeOwned>(store: &dyn DocumentStore, collection: &str) -> Vec<T> {
    match store.find_docs(collection).await {
        Ok(docs) => {
            let batch: Vec<T> = docs
                .into_iter()
                .filter_map(|d| serde_json::from_value(d).ok())
                .collect();
            info!(collection, count = batch.len(), "read raw batch");
            batch
        }
        Err(e) => {
            warn!(collection, error = %e, "raw batch unavailable; treating as empty");
            Vec::new()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = config::load_default().context("loading settings")?;
    info!("pipeline run starting ---------------------");

    let store = HttpStore::new(&settings.store);

    let batches = RawBatches {
        reddit: read_raw_batch(&store, collections::RAW_REDDIT_POSTS).await,
        twitter: read_raw_batch(&store, collections::RAW_TWITTER_POSTS).await,
        news: read_raw_batch(&store, collections::RAW_NEWS_ARTICLES).await,
    };

    match pipeline::run(&store, &settings, batches).await {
        Ok(report) => {
            info!(
                unified = report.unified,
                inserted = report.inserted,
                topics_fitted = report.topics_fitted,
                "run finished"
            );
        }
        Err(e @ PipelineError::StageFailed { .. }) => {
            // Enrichment abandoned for this run; not fatal for the process.
            warn!(error = %e, "enrichment stage aborted");
        }
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "pipeline run failed");
            return Err(e.into());
        }
    }

    info!("pipeline run ended ---------------------");
    Ok(())
}
