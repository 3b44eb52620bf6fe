use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Post bodies are truncated to this length during normalization.
pub const MAX_BODY_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: i64,
    pub num_comments: u64,
    pub author: String,
    pub created_utc: i64,
    pub permalink: String,
    pub subreddit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub compound: f64,
    pub positive_hits: u32,
    pub negative_hits: u32,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            compound: 0.0,
            positive_hits: 0,
            negative_hits: 0,
        }
    }
}

/// A post annotated with the signals it matched. `matched_signals` is
/// non-empty by construction; `categories` maps category name to the
/// phrases that hit, with unmatched categories omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalMatch {
    pub post: Post,
    pub matched_signals: Vec<String>,
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordAlert {
    pub id: String,
    pub keywords: Vec<String>,
    pub subreddits: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub match_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Posted,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    pub content: String,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorConfig {
    pub competitors: Vec<String>,
    pub subreddits: Vec<String>,
}

/// Compact post fields carried in alert/competitor match records and
/// notification output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub score: i64,
    pub num_comments: u64,
    pub permalink: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            subreddit: post.subreddit.clone(),
            score: post.score,
            num_comments: post.num_comments,
            permalink: post.permalink.clone(),
        }
    }
}
