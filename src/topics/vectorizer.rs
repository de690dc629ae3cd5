// src/topics/vectorizer.rs
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

/// Bag-of-words count vectorizer with a fixed-size vocabulary.
///
/// The vocabulary keeps the top `max_features` terms by document frequency.
/// Ordering is fully deterministic: ties in document frequency break on the
/// term itself, and the final index order is alphabetical, so the same
/// corpus always produces the same document-term matrix.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
    max_features: usize,
}

impl CountVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            max_features,
        }
    }

    /// Build the vocabulary from tokenized documents.
    pub fn fit(&mut self, docs: &[Vec<String>]) {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = doc_freq.into_iter().collect();
        // Document frequency descending, term ascending on ties.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        // Alphabetical index order for stable term ids.
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        self.vocabulary.clear();
        self.terms.clear();
        for (idx, (term, _)) in ranked.into_iter().enumerate() {
            self.vocabulary.insert(term.to_string(), idx);
            self.terms.push(term.to_string());
        }
    }

    /// Tokenized documents -> (n_docs, n_terms) count matrix. Terms outside
    /// the fitted vocabulary are ignored, so a zero-overlap document maps to
    /// an all-zero row.
    pub fn transform(&self, docs: &[Vec<String>]) -> Array2<f64> {
        let mut matrix = Array2::zeros((docs.len(), self.terms.len()));
        for (doc_idx, doc) in docs.iter().enumerate() {
            for term in doc {
                if let Some(&term_idx) = self.vocabulary.get(term) {
                    matrix[[doc_idx, term_idx]] += 1.0;
                }
            }
        }
        matrix
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Vec<String>> {
        vec![
            vec!["bitcoin".into(), "trading".into()],
            vec!["ethereum".into(), "contracts".into()],
            vec!["bitcoin".into(), "ethereum".into(), "comparison".into()],
        ]
    }

    #[test]
    fn vocabulary_is_deterministic_across_fits() {
        let mut a = CountVectorizer::new(500);
        let mut b = CountVectorizer::new(500);
        a.fit(&docs());
        b.fit(&docs());
        assert_eq!(a.terms, b.terms);
    }

    #[test]
    fn max_features_keeps_highest_document_frequency() {
        let mut v = CountVectorizer::new(2);
        v.fit(&docs());
        assert_eq!(v.vocabulary_size(), 2);
        // bitcoin and ethereum both appear in two documents.
        assert_eq!(v.terms, vec!["bitcoin".to_string(), "ethereum".to_string()]);
    }

    #[test]
    fn zero_overlap_document_maps_to_zero_row() {
        let mut v = CountVectorizer::new(500);
        v.fit(&docs());
        let m = v.transform(&[vec!["quantum".into(), "biology".into()]]);
        assert_eq!(m.row(0).sum(), 0.0);
    }
}
