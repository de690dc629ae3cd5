// src/topics/mod.rs
pub mod lda;
pub mod tokenizer;
pub mod vectorizer;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::TopicSettings;
use crate::types::{Topic, TopicAssignment, TOPIC_UNASSIGNED};
use lda::{Lda, LdaConfig};
use tokenizer::Tokenizer;
use vectorizer::CountVectorizer;

/// Number of keywords carried per topic/assignment.
pub const TOPIC_KEYWORD_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("number of topics must be positive")]
    InvalidTopicCount,

    #[error("empty vocabulary after tokenization and stop-word filtering")]
    EmptyVocabulary,

    #[error("model not fitted")]
    NotFitted,
}

/// Bag-of-words + LDA topic modeler.
///
/// `fit` builds a fixed-size vocabulary (top terms by document frequency,
/// stop words excluded) over the corpus and runs the seeded Gibbs sampler.
/// The caller enforces the minimum-corpus threshold; this type assumes the
/// corpus handed to `fit` is worth fitting.
#[derive(Debug, Clone)]
pub struct TopicModeler {
    tokenizer: Tokenizer,
    vectorizer: CountVectorizer,
    lda: Option<Lda>,
    settings: TopicSettings,
    n_topics: usize,
}

impl TopicModeler {
    pub fn new(settings: &TopicSettings) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            vectorizer: CountVectorizer::new(settings.max_features),
            lda: None,
            settings: settings.clone(),
            n_topics: settings.n_topics,
        }
    }

    /// Override the topic count chosen at construction (the backfill job
    /// derives it from the number of already-persisted topics).
    pub fn with_n_topics(mut self, n_topics: usize) -> Self {
        self.n_topics = n_topics;
        self
    }

    fn lda_config(&self) -> LdaConfig {
        LdaConfig {
            n_topics: self.n_topics,
            alpha: self.settings.alpha,
            beta: self.settings.beta,
            n_iterations: self.settings.iterations,
            seed: self.settings.seed,
        }
    }

    /// Fit vocabulary and topic model over the full corpus. Deterministic:
    /// the same (corpus, seed) produces identical topic-term distributions.
    pub fn fit(&mut self, corpus: &[String]) -> Result<(), TopicError> {
        let tokenized: Vec<Vec<String>> = corpus.iter().map(|t| self.tokenizer.tokenize(t)).collect();
        self.vectorizer.fit(&tokenized);
        if self.vectorizer.vocabulary_size() == 0 {
            return Err(TopicError::EmptyVocabulary);
        }

        let dtm = self.vectorizer.transform(&tokenized);
        let mut lda = Lda::new(self.lda_config())?;
        lda.fit(&dtm)?;
        self.lda = Some(lda);

        info!(
            docs = corpus.len(),
            vocabulary = self.vectorizer.vocabulary_size(),
            n_topics = self.n_topics,
            "topic model fitted"
        );
        Ok(())
    }

    /// Assign each text its argmax topic, the max probability as
    /// confidence, and the topic's keyword list. Total: before a fit every
    /// text maps to the unassigned defaults. Argmax ties break to the
    /// lowest topic id.
    pub fn transform(&self, texts: &[String]) -> Vec<TopicAssignment> {
        let Some(lda) = self.lda.as_ref() else {
            return texts
                .iter()
                .map(|t| TopicAssignment {
                    text: t.clone(),
                    topic_id: TOPIC_UNASSIGNED,
                    topic_confidence: 0.0,
                    topic_keywords: Vec::new(),
                })
                .collect();
        };

        let tokenized: Vec<Vec<String>> = texts.iter().map(|t| self.tokenizer.tokenize(t)).collect();
        let dtm = self.vectorizer.transform(&tokenized);
        // The model is fitted here; transform only errors on NotFitted.
        let probs = lda.transform(&dtm).unwrap_or_else(|_| {
            ndarray::Array2::from_elem((texts.len(), self.n_topics), 1.0 / self.n_topics as f64)
        });

        texts
            .iter()
            .enumerate()
            .map(|(doc_idx, text)| {
                let mut best_topic = 0usize;
                let mut best_prob = f64::MIN;
                for topic in 0..self.n_topics {
                    let p = probs[[doc_idx, topic]];
                    if p > best_prob {
                        best_prob = p;
                        best_topic = topic;
                    }
                }
                TopicAssignment {
                    text: text.clone(),
                    topic_id: best_topic as i32,
                    topic_confidence: best_prob,
                    topic_keywords: self.topic_keywords(best_topic as i32),
                }
            })
            .collect()
    }

    /// Top keywords for a topic, most representative first. Total lookup:
    /// out-of-range or unfitted returns an empty list.
    pub fn topic_keywords(&self, topic_id: i32) -> Vec<String> {
        let Some(lda) = self.lda.as_ref() else {
            return Vec::new();
        };
        if topic_id < 0 || topic_id as usize >= self.n_topics {
            return Vec::new();
        }
        let indices = match lda.top_term_indices(topic_id as usize, TOPIC_KEYWORD_COUNT) {
            Ok(v) => v,
            Err(_) => return Vec::new(),
        };
        indices
            .into_iter()
            .filter_map(|idx| self.vectorizer.term(idx).map(str::to_string))
            .collect()
    }

    /// Display label derived from the top two keywords, e.g.
    /// "Topic 3: market - rally". Out-of-range ids get the bare label.
    pub fn topic_name(&self, topic_id: i32) -> String {
        let keywords = self.topic_keywords(topic_id);
        match keywords.as_slice() {
            [] => format!("Topic {topic_id}"),
            [w1] => format!("Topic {topic_id}: {w1}"),
            [w1, w2, ..] => format!("Topic {topic_id}: {w1} - {w2}"),
        }
    }

    /// Snapshot every fitted topic for persistence.
    pub fn topics(&self, created_at: DateTime<Utc>) -> Vec<Topic> {
        if self.lda.is_none() {
            return Vec::new();
        }
        (0..self.n_topics as i32)
            .map(|topic_id| Topic {
                topic_id,
                topic_name: self.topic_name(topic_id),
                topic_keywords: self.topic_keywords(topic_id),
                created_at,
            })
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        self.lda.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TopicSettings {
        TopicSettings {
            n_topics: 2,
            max_features: 100,
            min_corpus_size: 10,
            iterations: 100,
            seed: 42,
            alpha: 0.1,
            beta: 0.01,
        }
    }

    fn corpus() -> Vec<String> {
        vec![
            "bitcoin price rally continues".into(),
            "bitcoin trading volume surges".into(),
            "bitcoin price hits new high".into(),
            "parliament debates election reform".into(),
            "election campaign enters final week".into(),
            "parliament passes election law".into(),
        ]
    }

    #[test]
    fn unfitted_transform_yields_unassigned_defaults() {
        let modeler = TopicModeler::new(&settings());
        let out = modeler.transform(&["anything".to_string()]);
        assert_eq!(out[0].topic_id, TOPIC_UNASSIGNED);
        assert_eq!(out[0].topic_confidence, 0.0);
        assert!(out[0].topic_keywords.is_empty());
    }

    #[test]
    fn fit_then_transform_assigns_in_range_topics() {
        let s = settings();
        let mut modeler = TopicModeler::new(&s);
        modeler.fit(&corpus()).unwrap();

        let out = modeler.transform(&corpus());
        assert_eq!(out.len(), 6);
        for a in &out {
            assert!(a.topic_id >= 0 && (a.topic_id as usize) < s.n_topics);
            assert!(a.topic_confidence > 0.0 && a.topic_confidence <= 1.0);
            assert!(!a.topic_keywords.is_empty());
        }
    }

    #[test]
    fn keyword_lookup_is_total() {
        let s = settings();
        let mut modeler = TopicModeler::new(&s);
        modeler.fit(&corpus()).unwrap();

        assert!(modeler.topic_keywords(99).is_empty());
        assert!(modeler.topic_keywords(-1).is_empty());
        assert_eq!(modeler.topic_name(99), "Topic 99");
        assert!(modeler.topic_name(0).starts_with("Topic 0: "));
    }

    #[test]
    fn fit_is_deterministic_for_fixed_corpus_and_seed() {
        let s = settings();
        let mut a = TopicModeler::new(&s);
        let mut b = TopicModeler::new(&s);
        a.fit(&corpus()).unwrap();
        b.fit(&corpus()).unwrap();

        for topic_id in 0..s.n_topics as i32 {
            assert_eq!(a.topic_keywords(topic_id), b.topic_keywords(topic_id));
        }
    }

    #[test]
    fn topics_snapshot_covers_every_topic() {
        let s = settings();
        let mut modeler = TopicModeler::new(&s);
        modeler.fit(&corpus()).unwrap();

        let topics = modeler.topics(Utc::now());
        assert_eq!(topics.len(), s.n_topics);
        assert_eq!(topics[0].topic_id, 0);
        assert!(topics[0].topic_keywords.len() <= TOPIC_KEYWORD_COUNT);
    }
}
