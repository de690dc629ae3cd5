// src/unify.rs
// Merges the three sentiment-decorated batches into the canonical record
// shape. Concatenation order is reddit, twitter, news; the order is a
// stability guarantee for fixtures, not a semantic requirement.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::types::{
    ScoredHeadline, ScoredRedditPost, ScoredTweet, Source, UnifiedRecord, TOPIC_KEYWORDS_DEFAULT,
    TOPIC_UNASSIGNED,
};

/// Stable content key for a headline: hex sha-256 over url + title.
///
/// Headlines carry no provider id, and a run-local counter would break
/// cross-run deduplication (the (source, source_id) invariant), so the key
/// is derived from document content instead.
pub fn headline_key(url: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Map each source's records into `UnifiedRecord` and concatenate.
/// All three inputs empty yields an empty output, never an error.
/// Topic fields start at their unassigned defaults.
pub fn unify(
    reddit: Vec<ScoredRedditPost>,
    twitter: Vec<ScoredTweet>,
    news: Vec<ScoredHeadline>,
) -> Vec<UnifiedRecord> {
    let mut out = Vec::with_capacity(reddit.len() + twitter.len() + news.len());

    for p in reddit {
        // Stable id: the post url when present, otherwise the title.
        let source_id = p
            .raw
            .url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| p.text.clone());
        out.push(UnifiedRecord {
            source: Source::Reddit,
            source_id,
            text: p.text,
            created_at: p.raw.created_utc.unwrap_or(p.processed_at),
            sentiment_compound: p.sentiment.compound,
            sentiment_positive: p.sentiment.positive,
            sentiment_neutral: p.sentiment.neutral,
            sentiment_negative: p.sentiment.negative,
            processed_at: p.processed_at,
            topic_id: TOPIC_UNASSIGNED,
            topic_confidence: 0.0,
            topic_keywords: TOPIC_KEYWORDS_DEFAULT.to_string(),
        });
    }

    for t in twitter {
        out.push(UnifiedRecord {
            source: Source::Twitter,
            source_id: t.raw.id.clone(),
            text: t.text,
            created_at: t.raw.created_at.unwrap_or(t.processed_at),
            sentiment_compound: t.sentiment.compound,
            sentiment_positive: t.sentiment.positive,
            sentiment_neutral: t.sentiment.neutral,
            sentiment_negative: t.sentiment.negative,
            processed_at: t.processed_at,
            topic_id: TOPIC_UNASSIGNED,
            topic_confidence: 0.0,
            topic_keywords: TOPIC_KEYWORDS_DEFAULT.to_string(),
        });
    }

    for h in news {
        let url = h.raw.url.clone().unwrap_or_default();
        let title = h.raw.title.clone().unwrap_or_default();
        out.push(UnifiedRecord {
            source: Source::News,
            source_id: headline_key(&url, &title),
            text: h.text,
            created_at: h.raw.extracted_at.unwrap_or(h.processed_at),
            sentiment_compound: h.sentiment.compound,
            sentiment_positive: h.sentiment.positive,
            sentiment_neutral: h.sentiment.neutral,
            sentiment_negative: h.sentiment.negative,
            processed_at: h.processed_at,
            topic_id: TOPIC_UNASSIGNED,
            topic_confidence: 0.0,
            topic_keywords: TOPIC_KEYWORDS_DEFAULT.to_string(),
        });
    }

    info!(count = out.len(), "unified records from all sources");
    out
}
