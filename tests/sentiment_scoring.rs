// tests/sentiment_scoring.rs
use global_sentiment_etl::{SentimentAnalyzer, SentimentScore};

#[test]
fn score_is_deterministic() {
    let a = SentimentAnalyzer::new();
    let texts = [
        "Stock market hits record high",
        "Inflation concerns grow",
        "This is a great day, very happy with the results",
    ];
    for t in texts {
        assert_eq!(a.score(Some(t)), a.score(Some(t)));
    }
}

#[test]
fn degenerate_inputs_yield_the_zero_score() {
    let a = SentimentAnalyzer::new();
    assert_eq!(a.score(None), SentimentScore::ZERO);
    assert_eq!(a.score(Some("")), SentimentScore::ZERO);
    // Non-text content: digits and punctuation carry no tokens worth scoring
    // beyond neutral mass, and pure punctuation yields no tokens at all.
    assert_eq!(a.score(Some("?!...")), SentimentScore::ZERO);
}

#[test]
fn compound_is_bounded_and_masses_sum_to_one() {
    let a = SentimentAnalyzer::new();
    let s = a.score(Some(
        "terrible disaster and crisis, yet a great recovery and win for everyone",
    ));
    assert!(s.compound >= -1.0 && s.compound <= 1.0);
    assert!((s.positive + s.neutral + s.negative - 1.0).abs() < 1e-9);
}

#[test]
fn opposite_polarity_texts_score_on_opposite_sides() {
    let a = SentimentAnalyzer::new();
    let up = a.score(Some("Great news about the economy"));
    let down = a.score(Some("Terrible weather today"));
    assert!(up.compound > 0.0);
    assert!(down.compound < 0.0);
}
