//! Signal matching: flags posts whose text contains catalog phrases and
//! groups the hits by category.

use crate::catalog::SignalCatalog;
use crate::types::{Post, SignalMatch};
use std::collections::BTreeMap;

/// Phrase hits for a piece of text, grouped by category. Categories with no
/// hits are omitted; a text may belong to several categories at once.
#[derive(Debug, Clone)]
pub struct CategorizedText {
    pub matched_signals: Vec<String>,
    pub categories: BTreeMap<String, Vec<String>>,
}

pub struct SignalMatcher {
    catalog: SignalCatalog,
}

impl SignalMatcher {
    pub fn new(catalog: SignalCatalog) -> Self {
        Self { catalog }
    }

    /// Match every catalog phrase against the lowercased title+body as a
    /// substring. Substring rather than word-boundary matching is
    /// intentional: the catalog is dominated by multi-word phrases that
    /// must hit mid-sentence, at the accepted cost of occasional false
    /// positives on short signals. Returns `None` when nothing hits.
    pub fn categorize(&self, title: &str, body: &str) -> Option<CategorizedText> {
        let haystack = format!("{} {}", title, body).to_lowercase();

        let mut matched_signals: Vec<String> = Vec::new();
        let mut categories = BTreeMap::new();

        for category in self.catalog.categories() {
            let hits: Vec<String> = category
                .phrases
                .iter()
                .filter(|phrase| haystack.contains(phrase.as_str()))
                .cloned()
                .collect();

            if !hits.is_empty() {
                for hit in &hits {
                    if !matched_signals.contains(hit) {
                        matched_signals.push(hit.clone());
                    }
                }
                categories.insert(category.name.clone(), hits);
            }
        }

        if matched_signals.is_empty() {
            None
        } else {
            Some(CategorizedText {
                matched_signals,
                categories,
            })
        }
    }

    /// Categorize a post; sentiment is left unset for the caller to attach.
    pub fn match_post(&self, post: &Post) -> Option<SignalMatch> {
        self.categorize(&post.title, &post.body)
            .map(|categorized| SignalMatch {
                post: post.clone(),
                matched_signals: categorized.matched_signals,
                categories: categorized.categories,
                sentiment: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SignalCatalog, SignalCategory};

    fn matcher() -> SignalMatcher {
        SignalMatcher::new(SignalCatalog::pain_points())
    }

    #[test]
    fn unmatched_text_returns_none() {
        assert!(matcher()
            .categorize("Weekly standup notes", "nothing remarkable happened")
            .is_none());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = matcher().categorize("LOOKING FOR a new CRM", "").unwrap();
        assert!(result
            .matched_signals
            .contains(&"looking for".to_string()));
    }

    #[test]
    fn phrases_match_as_substrings() {
        // "jobber" still contains "job"-style short signals; here the
        // catalog phrase "looking for" hits inside a longer sentence.
        let result = matcher()
            .categorize("", "we are looking forward, er, looking for a tool")
            .unwrap();
        assert_eq!(result.categories.len(), 1);
        assert!(result.categories.contains_key("help_seeking"));
    }

    #[test]
    fn one_post_can_match_multiple_categories() {
        let result = matcher()
            .categorize(
                "Looking for an alternative to BigCRM",
                "it is too expensive for our team",
            )
            .unwrap();
        assert!(result.categories.contains_key("help_seeking"));
        assert!(result.categories.contains_key("alternatives"));
        assert!(result.categories.contains_key("pricing"));
        assert!(result.matched_signals.len() >= 3);
    }

    #[test]
    fn category_keys_come_from_the_catalog() {
        let result = matcher()
            .categorize("so frustrated with this workflow", "")
            .unwrap();
        let catalog = SignalCatalog::pain_points();
        let names: Vec<&str> = catalog
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        for key in result.categories.keys() {
            assert!(names.contains(&key.as_str()));
        }
    }

    #[test]
    fn duplicate_phrases_across_categories_are_reported_once() {
        let catalog = SignalCatalog::new(vec![
            SignalCategory {
                name: "a".to_string(),
                phrases: vec!["shared phrase".to_string()],
            },
            SignalCategory {
                name: "b".to_string(),
                phrases: vec!["shared phrase".to_string()],
            },
        ]);
        let result = SignalMatcher::new(catalog)
            .categorize("a shared phrase appears", "")
            .unwrap();
        assert_eq!(result.matched_signals.len(), 1);
        assert_eq!(result.categories.len(), 2);
    }

    #[test]
    fn match_post_carries_the_post_through() {
        let post = Post {
            id: "abc123".to_string(),
            title: "Looking for a CRM alternative".to_string(),
            body: String::new(),
            score: 12,
            num_comments: 3,
            author: "someone".to_string(),
            created_utc: 1_700_000_000,
            permalink: "https://www.reddit.com/r/SaaS/comments/abc123/".to_string(),
            subreddit: "SaaS".to_string(),
        };
        let matched = matcher().match_post(&post).unwrap();
        assert_eq!(matched.post.id, "abc123");
        assert!(matched.sentiment.is_none());
        assert!(!matched.matched_signals.is_empty());
    }
}
