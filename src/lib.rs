// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod sentiment;
pub mod store;
pub mod topics;
pub mod types;
pub mod unify;
pub mod writer;

// ---- Re-exports for stable public API ----
pub use crate::error::{PipelineError, Stage, StoreError};
pub use crate::pipeline::{run, RawBatches, RunReport};
pub use crate::sentiment::SentimentAnalyzer;
pub use crate::store::DocumentStore;
pub use crate::types::{SentimentScore, Source, Topic, UnifiedRecord};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize compact tracing for the batch binaries. Honors RUST_LOG,
/// defaults to info for this crate.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("global_sentiment_etl=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
