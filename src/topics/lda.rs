// src/topics/lda.rs
// Latent Dirichlet Allocation via collapsed Gibbs sampling. The sampler is
// seeded, so a fixed (corpus, seed) pair reproduces bit-identical
// topic-term counts.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::TopicError;

#[derive(Debug, Clone)]
pub struct LdaConfig {
    pub n_topics: usize,
    /// Document-topic prior.
    pub alpha: f64,
    /// Topic-word prior.
    pub beta: f64,
    pub n_iterations: usize,
    pub seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 5,
            alpha: 0.1,
            beta: 0.01,
            n_iterations: 200,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lda {
    config: LdaConfig,
    topic_word_counts: Option<Array2<f64>>,
    topic_counts: Option<Array1<f64>>,
    n_words: usize,
}

impl Lda {
    pub fn new(config: LdaConfig) -> Result<Self, TopicError> {
        if config.n_topics == 0 {
            return Err(TopicError::InvalidTopicCount);
        }
        Ok(Self {
            config,
            topic_word_counts: None,
            topic_counts: None,
            n_words: 0,
        })
    }

    pub fn n_topics(&self) -> usize {
        self.config.n_topics
    }

    /// Fit on a document-term count matrix. Blocking and uninterruptible;
    /// the caller decides up front whether the corpus is worth a fit.
    pub fn fit(&mut self, dtm: &Array2<f64>) -> Result<(), TopicError> {
        let n_docs = dtm.nrows();
        self.n_words = dtm.ncols();
        let n_topics = self.config.n_topics;

        if n_docs == 0 || self.n_words == 0 {
            return Err(TopicError::EmptyVocabulary);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // Word-occurrence list per document: (word_idx, count).
        let mut doc_words: Vec<Vec<(usize, usize)>> = Vec::with_capacity(n_docs);
        for doc_idx in 0..n_docs {
            let mut words = Vec::new();
            for word_idx in 0..self.n_words {
                let count = dtm[[doc_idx, word_idx]] as usize;
                if count > 0 {
                    words.push((word_idx, count));
                }
            }
            doc_words.push(words);
        }

        // Random initial assignment of each word occurrence to a topic.
        let mut topic_assignments: Vec<Vec<usize>> = Vec::with_capacity(n_docs);
        let mut topic_word_counts = Array2::zeros((n_topics, self.n_words));
        let mut doc_topic_counts = Array2::zeros((n_docs, n_topics));
        let mut topic_counts = Array1::zeros(n_topics);

        for (doc_idx, words) in doc_words.iter().enumerate() {
            let mut assignments = Vec::new();
            for &(word_idx, count) in words {
                for _ in 0..count {
                    let topic = rng.random_range(0..n_topics);
                    assignments.push(topic);
                    topic_word_counts[[topic, word_idx]] += 1.0;
                    doc_topic_counts[[doc_idx, topic]] += 1.0;
                    topic_counts[topic] += 1.0;
                }
            }
            topic_assignments.push(assignments);
        }

        let alpha = self.config.alpha;
        let beta = self.config.beta;
        let beta_sum = beta * self.n_words as f64;

        for _ in 0..self.config.n_iterations {
            for (doc_idx, words) in doc_words.iter().enumerate() {
                let mut word_pos = 0;
                for &(word_idx, count) in words {
                    for _ in 0..count {
                        let old_topic = topic_assignments[doc_idx][word_pos];
                        topic_word_counts[[old_topic, word_idx]] -= 1.0;
                        doc_topic_counts[[doc_idx, old_topic]] -= 1.0;
                        topic_counts[old_topic] -= 1.0;

                        let new_topic = sample_topic(
                            word_idx,
                            doc_idx,
                            &topic_word_counts,
                            &doc_topic_counts,
                            &topic_counts,
                            n_topics,
                            alpha,
                            beta,
                            beta_sum,
                            &mut rng,
                        );

                        topic_word_counts[[new_topic, word_idx]] += 1.0;
                        doc_topic_counts[[doc_idx, new_topic]] += 1.0;
                        topic_counts[new_topic] += 1.0;
                        topic_assignments[doc_idx][word_pos] = new_topic;
                        word_pos += 1;
                    }
                }
            }
        }

        self.topic_word_counts = Some(topic_word_counts);
        self.topic_counts = Some(topic_counts);
        Ok(())
    }

    /// Infer document-topic probabilities for new documents against the
    /// fitted topic-word counts. A document with no vocabulary overlap
    /// yields the uniform-prior row.
    pub fn transform(&self, dtm: &Array2<f64>) -> Result<Array2<f64>, TopicError> {
        let topic_word_counts = self.topic_word_counts.as_ref().ok_or(TopicError::NotFitted)?;
        let topic_counts = self.topic_counts.as_ref().ok_or(TopicError::NotFitted)?;

        let n_docs = dtm.nrows();
        let n_topics = self.config.n_topics;
        let alpha = self.config.alpha;
        let beta = self.config.beta;
        let beta_sum = beta * self.n_words as f64;

        let mut doc_topics = Array2::zeros((n_docs, n_topics));

        for doc_idx in 0..n_docs {
            let mut local_counts = vec![0.0f64; n_topics];
            let mut any_word = false;

            for word_idx in 0..dtm.ncols().min(self.n_words) {
                let count = dtm[[doc_idx, word_idx]] as usize;
                for _ in 0..count {
                    any_word = true;
                    // Assign the occurrence to its most likely topic; ties
                    // resolve to the lowest topic id (strict comparison).
                    let mut best_topic = 0;
                    let mut best_prob = f64::MIN;
                    for topic in 0..n_topics {
                        let prob = (topic_word_counts[[topic, word_idx]] + beta)
                            / (topic_counts[topic] + beta_sum);
                        if prob > best_prob {
                            best_prob = prob;
                            best_topic = topic;
                        }
                    }
                    local_counts[best_topic] += 1.0;
                }
            }

            if !any_word {
                for topic in 0..n_topics {
                    doc_topics[[doc_idx, topic]] = 1.0 / n_topics as f64;
                }
                continue;
            }

            let total: f64 = local_counts.iter().sum::<f64>() + n_topics as f64 * alpha;
            for topic in 0..n_topics {
                doc_topics[[doc_idx, topic]] = (local_counts[topic] + alpha) / total;
            }
        }

        Ok(doc_topics)
    }

    /// Term indices of the `n` heaviest words for a topic, weight
    /// descending with index-ascending tie-break.
    pub fn top_term_indices(&self, topic: usize, n: usize) -> Result<Vec<usize>, TopicError> {
        let topic_word_counts = self.topic_word_counts.as_ref().ok_or(TopicError::NotFitted)?;
        if topic >= self.config.n_topics {
            return Ok(Vec::new());
        }

        let mut weighted: Vec<(usize, f64)> = topic_word_counts
            .row(topic)
            .iter()
            .enumerate()
            .map(|(idx, &w)| (idx, w))
            .collect();
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        weighted.truncate(n);
        Ok(weighted.into_iter().map(|(idx, _)| idx).collect())
    }

    /// Raw topic-term counts, exposed for determinism checks.
    pub fn topic_word_counts(&self) -> Option<&Array2<f64>> {
        self.topic_word_counts.as_ref()
    }
}

#[allow(clippy::too_many_arguments)]
fn sample_topic(
    word_idx: usize,
    doc_idx: usize,
    topic_word_counts: &Array2<f64>,
    doc_topic_counts: &Array2<f64>,
    topic_counts: &Array1<f64>,
    n_topics: usize,
    alpha: f64,
    beta: f64,
    beta_sum: f64,
    rng: &mut StdRng,
) -> usize {
    let doc_total = doc_topic_counts.row(doc_idx).sum() + n_topics as f64 * alpha;
    let mut probs = Vec::with_capacity(n_topics);
    let mut total = 0.0;

    for topic in 0..n_topics {
        // P(topic | doc) * P(word | topic)
        let doc_topic = (doc_topic_counts[[doc_idx, topic]] + alpha) / doc_total;
        let topic_word =
            (topic_word_counts[[topic, word_idx]] + beta) / (topic_counts[topic] + beta_sum);
        let prob = doc_topic * topic_word;
        total += prob;
        probs.push(prob);
    }

    let threshold = rng.random::<f64>() * total;
    let mut cumsum = 0.0;
    for (topic, &prob) in probs.iter().enumerate() {
        cumsum += prob;
        if cumsum >= threshold {
            return topic;
        }
    }
    n_topics - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn two_topic_dtm() -> Array2<f64> {
        // Documents 0-2 use terms 0-2, documents 3-5 use terms 3-5.
        Array2::from_shape_vec(
            (6, 6),
            vec![
                3.0, 2.0, 2.0, 0.0, 0.0, 0.0, //
                2.0, 3.0, 1.0, 0.0, 0.0, 0.0, //
                1.0, 2.0, 3.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 3.0, 2.0, 2.0, //
                0.0, 0.0, 0.0, 2.0, 3.0, 1.0, //
                0.0, 0.0, 0.0, 1.0, 2.0, 3.0, //
            ],
        )
        .unwrap()
    }

    #[test]
    fn zero_topics_is_rejected() {
        let cfg = LdaConfig {
            n_topics: 0,
            ..Default::default()
        };
        assert!(Lda::new(cfg).is_err());
    }

    #[test]
    fn fit_is_deterministic_for_fixed_seed() {
        let dtm = two_topic_dtm();
        let cfg = LdaConfig {
            n_topics: 2,
            n_iterations: 100,
            seed: 7,
            ..Default::default()
        };
        let mut a = Lda::new(cfg.clone()).unwrap();
        let mut b = Lda::new(cfg).unwrap();
        a.fit(&dtm).unwrap();
        b.fit(&dtm).unwrap();
        assert_eq!(a.topic_word_counts(), b.topic_word_counts());
    }

    #[test]
    fn separated_word_groups_land_in_different_topics() {
        let dtm = two_topic_dtm();
        let cfg = LdaConfig {
            n_topics: 2,
            n_iterations: 200,
            seed: 42,
            ..Default::default()
        };
        let mut lda = Lda::new(cfg).unwrap();
        lda.fit(&dtm).unwrap();

        let probs = lda.transform(&dtm).unwrap();
        let argmax = |row: usize| {
            let mut best = 0;
            for t in 1..2 {
                if probs[[row, t]] > probs[[row, best]] {
                    best = t;
                }
            }
            best
        };
        assert_eq!(argmax(0), argmax(1));
        assert_eq!(argmax(3), argmax(4));
        assert_ne!(argmax(0), argmax(3));
    }

    #[test]
    fn transform_on_unfitted_model_errors() {
        let lda = Lda::new(LdaConfig::default()).unwrap();
        assert!(lda.transform(&Array2::zeros((1, 1))).is_err());
    }

    #[test]
    fn zero_overlap_document_gets_uniform_row() {
        let dtm = two_topic_dtm();
        let cfg = LdaConfig {
            n_topics: 2,
            n_iterations: 50,
            seed: 1,
            ..Default::default()
        };
        let mut lda = Lda::new(cfg).unwrap();
        lda.fit(&dtm).unwrap();

        let empty = Array2::zeros((1, 6));
        let probs = lda.transform(&empty).unwrap();
        assert!((probs[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((probs[[0, 1]] - 0.5).abs() < 1e-12);
    }
}
