// src/sentiment.rs
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::types::SentimentScore;

static LEXICON: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid sentiment lexicon")
});

/// Compound normalization constant (same role as VADER's alpha).
const COMPOUND_NORM: f64 = 15.0;

/// Lexicon-based polarity scorer. Stateless, deterministic, total:
/// any input maps to a score, empty/absent input maps to the zero score.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a word (0.0 when unknown).
    #[inline]
    fn word_valence(&self, w: &str) -> f64 {
        *LEXICON.get(w).unwrap_or(&0.0)
    }

    /// Score a text. `None`, empty and whitespace-only input all yield the
    /// degenerate zero score; this is defined behavior, not an error.
    ///
    /// Negation: a negator within the previous 1..=3 tokens inverts the
    /// sign of a word's lexicon valence.
    pub fn score(&self, text: Option<&str>) -> SentimentScore {
        let Some(text) = text else {
            return SentimentScore::ZERO;
        };

        // Collect into a vector because negation looks back at prior tokens.
        let tokens: Vec<String> = tokenize(text).collect();
        if tokens.is_empty() {
            return SentimentScore::ZERO;
        }

        let mut valence_sum = 0.0f64;
        let mut pos_mass = 0.0f64;
        let mut neg_mass = 0.0f64;
        let mut neutral_hits = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_valence(tokens[i].as_str());
            if base == 0.0 {
                neutral_hits += 1;
                continue;
            }

            // Is there a negator within the previous 1..=3 tokens?
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let v = if negated { -base } else { base };

            valence_sum += v;
            if v > 0.0 {
                pos_mass += v;
            } else {
                neg_mass += -v;
            }
        }

        let compound =
            (valence_sum / (valence_sum * valence_sum + COMPOUND_NORM).sqrt()).clamp(-1.0, 1.0);

        let total = pos_mass + neg_mass + neutral_hits as f64;
        // `tokens` is non-empty here, so total > 0.
        SentimentScore {
            compound,
            positive: pos_mass / total,
            neutral: neutral_hits as f64 / total,
            negative: neg_mass / total,
        }
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

/// Single-token negators ("no longer" is covered by "no" after tokenization,
/// contractions lose their apostrophe the same way: "isn't" -> "isn", "t").
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn"
            | "wasn"
            | "aren"
            | "cannot"
            | "don"
            | "doesn"
            | "didn"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_input_yield_zero_score() {
        let a = SentimentAnalyzer::new();
        assert_eq!(a.score(None), SentimentScore::ZERO);
        assert_eq!(a.score(Some("")), SentimentScore::ZERO);
        assert_eq!(a.score(Some("   \t ")), SentimentScore::ZERO);
        assert_eq!(a.score(Some("!!! ???")), SentimentScore::ZERO);
    }

    #[test]
    fn polarity_matches_lexicon() {
        let a = SentimentAnalyzer::new();
        assert!(a.score(Some("great news for everyone")).compound > 0.0);
        assert!(a.score(Some("a terrible disaster unfolds")).compound < 0.0);
    }

    #[test]
    fn negation_flips_sign() {
        let a = SentimentAnalyzer::new();
        let plain = a.score(Some("this is good"));
        let negated = a.score(Some("this is not good"));
        assert!(plain.compound > 0.0);
        assert!(negated.compound < 0.0);
    }

    #[test]
    fn component_masses_sum_to_one() {
        let a = SentimentAnalyzer::new();
        let s = a.score(Some("great win despite the terrible weather today"));
        let sum = s.positive + s.neutral + s.negative;
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(s.positive > 0.0 && s.negative > 0.0 && s.neutral > 0.0);
    }

    #[test]
    fn scoring_is_deterministic() {
        let a = SentimentAnalyzer::new();
        let t = "markets rally after strong earnings, fears of recession fade";
        assert_eq!(a.score(Some(t)), a.score(Some(t)));
    }

    #[test]
    fn neutral_text_has_zero_compound_and_full_neutral_mass() {
        let a = SentimentAnalyzer::new();
        let s = a.score(Some("the committee met on tuesday"));
        assert_eq!(s.compound, 0.0);
        assert!((s.neutral - 1.0).abs() < 1e-9);
    }
}
