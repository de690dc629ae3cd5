// src/types.rs
// Record shapes flowing through the pipeline: source-specific raw batches,
// sentiment-decorated batches, and the canonical unified record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a document. Together with `source_id` this pair uniquely
/// identifies a document across runs (the dedup invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Reddit,
    Twitter,
    News,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Reddit => write!(f, "reddit"),
            Source::Twitter => write!(f, "twitter"),
            Source::News => write!(f, "news"),
        }
    }
}

/// Polarity scores for one text. `compound` lives in [-1, 1]; the three
/// component masses are proportions that sum to ~1 for any scored text.
/// The all-zero value is the defined degenerate score for empty/absent input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentScore {
    pub const ZERO: SentimentScore = SentimentScore {
        compound: 0.0,
        positive: 0.0,
        neutral: 0.0,
        negative: 0.0,
    };
}

// ---- Raw acquisition shapes (one per source, schema varies) ----

/// Reddit submission as written by the acquisition job. Every field except
/// `id` may be absent in older raw documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRedditPost {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Selftext body, scored only as auxiliary signal.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub num_comments: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub subreddit: Option<String>,
}

/// Microblog post. `id` is the platform document id and doubles as the
/// stable `source_id` after unification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTweet {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_followers: Option<i64>,
    #[serde(default)]
    pub retweet_count: Option<i64>,
    #[serde(default)]
    pub reply_count: Option<i64>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub quote_count: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// News headline. Carries no provider id; the unifier derives a stable
/// content key from url+title instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHeadline {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Site name, e.g. "bbc".
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

// ---- Sentiment-decorated shapes (output of the normalizers) ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRedditPost {
    pub raw: RawRedditPost,
    /// Cleaned primary text (the title); empty when the title was absent.
    pub text: String,
    pub sentiment: SentimentScore,
    /// Compound score of the selftext body; auxiliary only, not unified.
    pub body_compound: f64,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredTweet {
    pub raw: RawTweet,
    pub text: String,
    pub sentiment: SentimentScore,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHeadline {
    pub raw: RawHeadline,
    pub text: String,
    pub sentiment: SentimentScore,
    pub processed_at: DateTime<Utc>,
}

// ---- Canonical unified record ----

/// Sentinel for a record not yet assigned to any topic.
pub const TOPIC_UNASSIGNED: i32 = -1;
/// Placeholder keyword string while a record awaits topic assignment.
pub const TOPIC_KEYWORDS_DEFAULT: &str = "Unknown";

/// The (source, source_id) identity pair the deduplicator keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DedupKey {
    pub source: Source,
    pub source_id: String,
}

/// The canonical enriched document persisted to `sentiment_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub source: Source,
    pub source_id: String,
    /// Primary textual content: title for reddit/news, body for twitter.
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub sentiment_compound: f64,
    pub sentiment_positive: f64,
    pub sentiment_neutral: f64,
    pub sentiment_negative: f64,
    pub processed_at: DateTime<Utc>,
    #[serde(default = "default_topic_id")]
    pub topic_id: i32,
    #[serde(default)]
    pub topic_confidence: f64,
    #[serde(default = "default_topic_keywords")]
    pub topic_keywords: String,
}

fn default_topic_id() -> i32 {
    TOPIC_UNASSIGNED
}

fn default_topic_keywords() -> String {
    TOPIC_KEYWORDS_DEFAULT.to_string()
}

impl UnifiedRecord {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            source: self.source,
            source_id: self.source_id.clone(),
        }
    }
}

/// One discovered topic, persisted per fit into the `topics` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: i32,
    pub topic_name: String,
    /// Up to 10 terms, most representative first.
    pub topic_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-document output of the topic model's transform step, keyed by text
/// so the merge back onto unified records never relies on positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub text: String,
    pub topic_id: i32,
    pub topic_confidence: f64,
    pub topic_keywords: Vec<String>,
}
