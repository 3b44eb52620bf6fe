//! Competitor mention tracking: the alert pipeline's shape, keyed on
//! competitor names and namespaced separately in the seen set.

use crate::pause_between_requests;
use reddit_client::{RedditClient, SortOrder};
use redscout_core::{
    CompetitorConfig, Post, PostSummary, ScoutError, Sentiment, SentimentLabel, SentimentScorer,
};
use serde::Serialize;
use std::collections::BTreeMap;
use storage::{JsonStore, SeenKey, SeenSet};
use tracing::{info, warn};

/// Characters of surrounding text captured on each side of a mention.
pub const CONTEXT_WINDOW: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorMention {
    pub competitor: String,
    pub context: String,
    pub sentiment: Sentiment,
    pub post: PostSummary,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CompetitorTally {
    pub mentions: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl CompetitorTally {
    fn record(&mut self, label: SentimentLabel) {
        self.mentions += 1;
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CompetitorReport {
    pub mentions: Vec<CompetitorMention>,
    pub by_competitor: BTreeMap<String, CompetitorTally>,
}

/// A bounded excerpt around the first occurrence of `needle_lower` in the
/// text, for human review. The excerpt is taken from the lowercased text,
/// which is also what matching ran against.
pub fn extract_context(text: &str, needle_lower: &str, window: usize) -> Option<String> {
    let lower = text.to_lowercase();
    let start_byte = lower.find(needle_lower)?;

    let prefix_chars = lower[..start_byte].chars().count();
    let needle_chars = needle_lower.chars().count();
    let chars: Vec<char> = lower.chars().collect();

    let start = prefix_chars.saturating_sub(window);
    let end = (prefix_chars + needle_chars + window).min(chars.len());
    Some(chars[start..end].iter().collect())
}

/// One competitor sweep over the configured communities. Like the alert
/// collector, this reads the seen set and returns the new keys instead of
/// writing anything, so the combined path can merge before persisting.
/// Dedup is per post: a post mentioning several competitors is fresh once,
/// and emits one mention per competitor when it is.
pub async fn collect_competitor_mentions(
    config: &CompetitorConfig,
    seen: &SeenSet,
    client: &RedditClient,
    scorer: &SentimentScorer,
    limit: u32,
) -> (CompetitorReport, Vec<SeenKey>) {
    let mut report = CompetitorReport::default();
    let mut additions = Vec::new();

    if config.competitors.is_empty() || config.subreddits.is_empty() {
        return (report, additions);
    }

    let competitors: Vec<String> = config
        .competitors
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    for (index, subreddit) in config.subreddits.iter().enumerate() {
        if index > 0 {
            pause_between_requests().await;
        }

        let posts = match client.fetch_page(subreddit, SortOrder::New, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(
                    "Competitor fetch for r/{} failed, skipping: {}",
                    subreddit, e
                );
                continue;
            }
        };

        for post in &posts {
            let mentioned = mentioned_competitors(post, &competitors);
            if mentioned.is_empty() {
                continue;
            }

            let key = SeenKey::Competitor(post.id.clone());
            if seen.contains(&key) || additions.contains(&key) {
                continue;
            }
            additions.push(key);

            let text = format!("{} {}", post.title, post.body);
            let sentiment = scorer.score(&text);

            for competitor in mentioned {
                let context = extract_context(&text, &competitor, CONTEXT_WINDOW)
                    .unwrap_or_default();
                report
                    .by_competitor
                    .entry(competitor.clone())
                    .or_default()
                    .record(sentiment.label);
                report.mentions.push(CompetitorMention {
                    competitor,
                    context,
                    sentiment: sentiment.clone(),
                    post: PostSummary::from(post),
                });
            }
        }
    }

    info!(
        "Competitor sweep found {} new mentions across {} names",
        report.mentions.len(),
        report.by_competitor.len()
    );
    (report, additions)
}

/// Standalone competitor check: collect, mark seen, persist once.
pub async fn check_competitors(
    store: &JsonStore,
    config: &CompetitorConfig,
    seen: &mut SeenSet,
    client: &RedditClient,
    scorer: &SentimentScorer,
    limit: u32,
) -> Result<CompetitorReport, ScoutError> {
    let (report, additions) = collect_competitor_mentions(config, seen, client, scorer, limit).await;
    for key in additions {
        seen.insert(key);
    }
    seen.flush(store).await?;
    Ok(report)
}

fn mentioned_competitors(post: &Post, competitors_lower: &[String]) -> Vec<String> {
    let haystack = format!("{} {}", post.title, post.body).to_lowercase();
    competitors_lower
        .iter()
        .filter(|name| haystack.contains(name.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_bounded_on_both_sides() {
        let text = format!("{}BigCRM{}", "a".repeat(100), "b".repeat(100));
        let context = extract_context(&text, "bigcrm", CONTEXT_WINDOW).unwrap();
        assert_eq!(context.chars().count(), CONTEXT_WINDOW * 2 + "bigcrm".len());
        assert!(context.contains("bigcrm"));
    }

    #[test]
    fn context_clamps_at_text_edges() {
        let context = extract_context("BigCRM is fine", "bigcrm", CONTEXT_WINDOW).unwrap();
        assert_eq!(context, "bigcrm is fine");
    }

    #[test]
    fn context_is_none_when_the_needle_is_absent() {
        assert!(extract_context("nothing here", "bigcrm", CONTEXT_WINDOW).is_none());
    }

    #[test]
    fn mentions_match_case_insensitively() {
        let post = Post {
            id: "p1".to_string(),
            title: "Thoughts on BIGCRM?".to_string(),
            body: "switched from smallcrm last month".to_string(),
            score: 5,
            num_comments: 2,
            author: "someone".to_string(),
            created_utc: 1_700_000_000,
            permalink: "https://www.reddit.com/r/SaaS/comments/p1/".to_string(),
            subreddit: "SaaS".to_string(),
        };
        let names = vec!["bigcrm".to_string(), "smallcrm".to_string(), "other".to_string()];
        let mentioned = mentioned_competitors(&post, &names);
        assert_eq!(mentioned, vec!["bigcrm".to_string(), "smallcrm".to_string()]);
    }
}
