// src/normalize/news.rs
use chrono::Utc;
use std::collections::HashSet;
use tracing::info;

use crate::normalize::clean_text;
use crate::sentiment::SentimentAnalyzer;
use crate::types::{RawHeadline, ScoredHeadline};

/// Decorate a raw headline batch with sentiment. Exact (title, url)
/// duplicates within the raw batch are dropped first, keeping the first
/// occurrence; scrapers routinely emit the same article under two
/// category pages.
pub fn normalize(analyzer: &SentimentAnalyzer, batch: Vec<RawHeadline>) -> Vec<ScoredHeadline> {
    let before = batch.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let deduped: Vec<RawHeadline> = batch
        .into_iter()
        .filter(|h| {
            // No content to key on: keep the record rather than collapse
            // all field-less headlines onto the ("", "") key.
            if h.title.is_none() && h.url.is_none() {
                return true;
            }
            seen.insert((
                h.title.clone().unwrap_or_default(),
                h.url.clone().unwrap_or_default(),
            ))
        })
        .collect();
    if deduped.len() < before {
        info!(
            dropped = before - deduped.len(),
            "dropped duplicate raw headlines"
        );
    }

    let processed_at = Utc::now();
    let out: Vec<ScoredHeadline> = deduped
        .into_iter()
        .map(|raw| {
            let text = clean_text(raw.title.as_deref().unwrap_or(""));
            let sentiment = analyzer.score(Some(text.as_str()));
            ScoredHeadline {
                raw,
                text,
                sentiment,
                processed_at,
            }
        })
        .collect();

    info!(count = out.len(), "normalized news batch");
    out
}
