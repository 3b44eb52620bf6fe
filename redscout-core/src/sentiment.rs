//! Lexicon-based sentiment scoring.
//!
//! Counts word-boundary lexicon hits over the input text, applies a local
//! bigram negation flip, and derives a bounded compound score with a
//! three-way label. Pure and deterministic; no model, no state.

use crate::catalog::SentimentLexicon;
use crate::types::{Sentiment, SentimentLabel};

/// Compound score at or above this is labeled positive; at or below the
/// negated value, negative.
const LABEL_THRESHOLD: f64 = 0.2;

pub struct SentimentScorer {
    lexicon: SentimentLexicon,
}

impl SentimentScorer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    /// Score free text. Empty or lexicon-free text yields the neutral
    /// sentiment with zero hits.
    pub fn score(&self, text: &str) -> Sentiment {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Sentiment::neutral();
        }

        let mut positive_hits = tokens.iter().filter(|t| self.is_positive(t)).count() as u32;
        let mut negative_hits = tokens.iter().filter(|t| self.is_negative(t)).count() as u32;

        // Local bigram negation: a negation token immediately before a word
        // carrying a lexicon stem flips that hit to the other side. Not
        // scope-aware negation.
        for pair in tokens.windows(2) {
            if !self.is_negation(&pair[0]) {
                continue;
            }
            if self.has_positive_stem(&pair[1]) {
                positive_hits = positive_hits.saturating_sub(1);
                negative_hits += 1;
            } else if self.has_negative_stem(&pair[1]) {
                negative_hits = negative_hits.saturating_sub(1);
                positive_hits += 1;
            }
        }

        let total = positive_hits + negative_hits;
        let compound = if total == 0 {
            0.0
        } else {
            (positive_hits as f64 - negative_hits as f64) / total as f64
        };

        let label = if compound >= LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        Sentiment {
            label,
            compound,
            positive_hits,
            negative_hits,
        }
    }

    fn is_positive(&self, token: &str) -> bool {
        self.lexicon.positive.iter().any(|w| w == token)
    }

    fn is_negative(&self, token: &str) -> bool {
        self.lexicon.negative.iter().any(|w| w == token)
    }

    fn is_negation(&self, token: &str) -> bool {
        self.lexicon.negations.iter().any(|w| w == token)
    }

    fn has_positive_stem(&self, token: &str) -> bool {
        self.lexicon.positive.iter().any(|w| token.contains(w.as_str()))
    }

    fn has_negative_stem(&self, token: &str) -> bool {
        self.lexicon.negative.iter().any(|w| token.contains(w.as_str()))
    }
}

/// Lowercased word tokens. Apostrophes stay inside tokens so contracted
/// negatives ("doesn't") survive as single words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SentimentLexicon;

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(SentimentLexicon::default())
    }

    #[test]
    fn scoring_is_deterministic() {
        let s = scorer();
        let text = "this tool is great but the pricing is terrible";
        assert_eq!(s.score(text), s.score(text));
    }

    #[test]
    fn empty_text_is_neutral() {
        let sentiment = scorer().score("");
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
        assert_eq!(sentiment.compound, 0.0);
        assert_eq!(sentiment.positive_hits, 0);
        assert_eq!(sentiment.negative_hits, 0);
    }

    #[test]
    fn lexicon_free_text_is_neutral() {
        let sentiment = scorer().score("the quick brown fox jumps over the lazy dog");
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
        assert_eq!(sentiment.compound, 0.0);
    }

    #[test]
    fn all_positive_text_scores_one() {
        let sentiment = scorer().score("love it, great and awesome");
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.compound, 1.0);
        assert_eq!(sentiment.negative_hits, 0);
    }

    #[test]
    fn boundary_compound_values_pick_the_strict_label() {
        // 3 positive, 2 negative -> compound exactly 0.2
        let sentiment = scorer().score("love great awesome hate terrible");
        assert!((sentiment.compound - 0.2).abs() < f64::EPSILON);
        assert_eq!(sentiment.label, SentimentLabel::Positive);

        // 2 positive, 3 negative -> compound exactly -0.2
        let sentiment = scorer().score("love great hate terrible awful");
        assert!((sentiment.compound + 0.2).abs() < f64::EPSILON);
        assert_eq!(sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn repeated_words_count_each_occurrence() {
        let sentiment = scorer().score("good good bad");
        assert_eq!(sentiment.positive_hits, 2);
        assert_eq!(sentiment.negative_hits, 1);
        assert_eq!(sentiment.label, SentimentLabel::Positive);
    }

    #[test]
    fn lexicon_words_match_on_word_boundaries_only() {
        // "scampi" contains "scam" but is not a whole-word hit
        let sentiment = scorer().score("scampi dinner");
        assert_eq!(sentiment.negative_hits, 0);
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
    }

    #[test]
    fn negation_flips_a_following_positive_word() {
        let sentiment = scorer().score("not helpful at all");
        assert_eq!(sentiment.positive_hits, 0);
        assert_eq!(sentiment.negative_hits, 1);
        assert_eq!(sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn negation_flips_a_following_negative_word() {
        let sentiment = scorer().score("honestly not bad");
        assert_eq!(sentiment.positive_hits, 1);
        assert_eq!(sentiment.negative_hits, 0);
        assert_eq!(sentiment.label, SentimentLabel::Positive);
    }

    #[test]
    fn contracted_negation_applies() {
        let sentiment = scorer().score("this doesn't work for me");
        assert_eq!(sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn alternate_lexicons_are_injectable() {
        let lexicon = SentimentLexicon {
            positive: vec!["rustacean".to_string()],
            negative: vec![],
            negations: vec![],
        };
        let sentiment = SentimentScorer::new(lexicon).score("proud rustacean here");
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.compound, 1.0);
    }
}
