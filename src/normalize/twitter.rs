// src/normalize/twitter.rs
use chrono::Utc;
use tracing::info;

use crate::normalize::clean_text;
use crate::sentiment::SentimentAnalyzer;
use crate::types::{RawTweet, ScoredTweet};

/// Decorate a raw tweet batch with sentiment. The body text is the primary
/// (and only) scored field.
pub fn normalize(analyzer: &SentimentAnalyzer, batch: Vec<RawTweet>) -> Vec<ScoredTweet> {
    let processed_at = Utc::now();
    let out: Vec<ScoredTweet> = batch
        .into_iter()
        .map(|raw| {
            let text = clean_text(raw.text.as_deref().unwrap_or(""));
            let sentiment = analyzer.score(Some(text.as_str()));
            ScoredTweet {
                raw,
                text,
                sentiment,
                processed_at,
            }
        })
        .collect();

    info!(count = out.len(), "normalized twitter batch");
    out
}
