//! Windowed digest aggregation.
//!
//! A digest is one fetch pass over the configured communities, reduced to
//! summary statistics. It never consults the seen set: consecutive digests
//! may repeat a post, and that is the intended reading of "summary of the
//! window" rather than "what is new".

use crate::pause_between_requests;
use crate::scan::ScanEngine;
use chrono::{DateTime, Utc};
use reddit_client::SortOrder;
use redscout_core::{PostSummary, ScoutError, SentimentLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storage::{JsonStore, DIGEST_DOC};
use tracing::{info, warn};

pub const DIGEST_PAGE_SIZE: u32 = 50;
pub const TOP_POSTS_CAP: usize = 10;
/// Comments weigh double in the engagement ranking.
pub const COMMENT_WEIGHT: i64 = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestTotals {
    pub post_count: u64,
    /// Distribution over pain-point-matched posts only, not the whole
    /// window.
    pub sentiment_over_pain_points: SentimentCounts,
    pub categories: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPost {
    pub post: PostSummary,
    pub engagement: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityBreakdown {
    pub subreddit: String,
    pub post_count: u64,
    pub total_score: i64,
    pub average_score: f64,
    pub pain_point_count: u64,
    pub opportunity_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub window: String,
    pub subreddits: Vec<String>,
    pub totals: DigestTotals,
    pub top_posts: Vec<TopPost>,
    pub communities: Vec<CommunityBreakdown>,
}

impl ScanEngine {
    /// Aggregate the last `window_hours` across the given communities into
    /// one digest snapshot.
    pub async fn build_digest(&self, subreddits: &[String], window_hours: i64) -> Digest {
        let now = Utc::now();
        let cutoff = now.timestamp() - window_hours * 3600;

        let mut totals = DigestTotals::default();
        let mut top_posts: Vec<TopPost> = Vec::new();
        let mut communities = Vec::with_capacity(subreddits.len());

        for (index, subreddit) in subreddits.iter().enumerate() {
            if index > 0 {
                pause_between_requests().await;
            }

            let posts = match self
                .client
                .fetch_page(subreddit, SortOrder::New, DIGEST_PAGE_SIZE)
                .await
            {
                Ok(posts) => posts,
                Err(e) => {
                    warn!("Digest fetch for r/{} failed, skipping: {}", subreddit, e);
                    continue;
                }
            };

            let windowed: Vec<_> = posts
                .into_iter()
                .filter(|p| p.created_utc >= cutoff && p.created_utc <= now.timestamp())
                .collect();

            let mut breakdown = CommunityBreakdown {
                subreddit: subreddit.clone(),
                post_count: windowed.len() as u64,
                total_score: 0,
                average_score: 0.0,
                pain_point_count: 0,
                opportunity_count: 0,
            };

            for post in &windowed {
                totals.post_count += 1;
                breakdown.total_score += post.score;
                top_posts.push(TopPost {
                    post: PostSummary::from(post),
                    engagement: engagement_score(post.score, post.num_comments),
                });

                if let Some(matched) = self.pain_matcher.match_post(post) {
                    breakdown.pain_point_count += 1;
                    for category in matched.categories.keys() {
                        *totals.categories.entry(category.clone()).or_insert(0) += 1;
                    }
                    let text = format!("{} {}", post.title, post.body);
                    match self.scorer.score(&text).label {
                        SentimentLabel::Positive => {
                            totals.sentiment_over_pain_points.positive += 1
                        }
                        SentimentLabel::Negative => {
                            totals.sentiment_over_pain_points.negative += 1
                        }
                        SentimentLabel::Neutral => totals.sentiment_over_pain_points.neutral += 1,
                    }
                }

                if self.opportunity_matcher.match_post(post).is_some() {
                    breakdown.opportunity_count += 1;
                }
            }

            if breakdown.post_count > 0 {
                breakdown.average_score =
                    breakdown.total_score as f64 / breakdown.post_count as f64;
            }
            communities.push(breakdown);
        }

        top_posts.sort_by(|a, b| b.engagement.cmp(&a.engagement));
        top_posts.truncate(TOP_POSTS_CAP);

        info!(
            "Digest generated: {} posts over the last {}h",
            totals.post_count, window_hours
        );

        Digest {
            generated_at: now,
            window: format!("last {} hours", window_hours),
            subreddits: subreddits.to_vec(),
            totals,
            top_posts,
            communities,
        }
    }
}

pub fn engagement_score(score: i64, num_comments: u64) -> i64 {
    score + COMMENT_WEIGHT * num_comments as i64
}

/// Persist the snapshot, replacing whatever the previous run left.
pub async fn store_digest(store: &JsonStore, digest: &Digest) -> Result<(), ScoutError> {
    store.save(DIGEST_DOC, digest).await
}
