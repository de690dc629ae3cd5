// src/normalize/reddit.rs
use chrono::Utc;
use tracing::info;

use crate::normalize::clean_text;
use crate::sentiment::SentimentAnalyzer;
use crate::types::{RawRedditPost, ScoredRedditPost};

/// Decorate a raw reddit batch with sentiment. The title is the primary
/// text; the selftext body is scored as auxiliary signal only. A post
/// without a title is kept and carries the degenerate zero score.
pub fn normalize(analyzer: &SentimentAnalyzer, batch: Vec<RawRedditPost>) -> Vec<ScoredRedditPost> {
    let processed_at = Utc::now();
    let out: Vec<ScoredRedditPost> = batch
        .into_iter()
        .map(|raw| {
            let text = clean_text(raw.title.as_deref().unwrap_or(""));
            let sentiment = analyzer.score(Some(text.as_str()));
            let body_compound = analyzer.score(raw.text.as_deref()).compound;
            ScoredRedditPost {
                raw,
                text,
                sentiment,
                body_compound,
                processed_at,
            }
        })
        .collect();

    info!(count = out.len(), "normalized reddit batch");
    out
}
