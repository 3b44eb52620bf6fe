//! The community scan: fetch, categorize, score, select trending, and
//! aggregate across communities.

use crate::pause_between_requests;
use reddit_client::{RedditClient, SortOrder};
use redscout_core::{
    Post, SentimentLexicon, SentimentScorer, SignalCatalog, SignalMatch, SignalMatcher,
};
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_SCORE_THRESHOLD: i64 = 50;
/// Alternate trending trigger: busy comment sections matter even at low
/// score.
pub const TRENDING_COMMENT_TRIGGER: u64 = 20;
/// Cross-community aggregate lists keep this many entries.
pub const AGGREGATE_CAP: usize = 20;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub limit: u32,
    pub sort: SortOrder,
    pub score_threshold: i64,
    pub with_sentiment: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            limit: 25,
            sort: SortOrder::Hot,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            with_sentiment: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommunityScan {
    pub subreddit: String,
    pub fetched: usize,
    pub pain_points: Vec<SignalMatch>,
    pub opportunities: Vec<SignalMatch>,
    pub trending: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommunityScan {
    fn failed(subreddit: &str, error: String) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            fetched: 0,
            pain_points: Vec::new(),
            opportunities: Vec::new(),
            trending: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub communities: Vec<CommunityScan>,
    pub top_pain_points: Vec<SignalMatch>,
    pub top_opportunities: Vec<SignalMatch>,
    pub top_trending: Vec<Post>,
}

pub struct ScanEngine {
    pub(crate) client: RedditClient,
    pub(crate) pain_matcher: SignalMatcher,
    pub(crate) opportunity_matcher: SignalMatcher,
    pub(crate) scorer: SentimentScorer,
}

impl ScanEngine {
    pub fn new(client: RedditClient) -> Self {
        Self::with_catalogs(
            client,
            SignalCatalog::pain_points(),
            SignalCatalog::opportunities(),
            SentimentLexicon::default(),
        )
    }

    pub fn with_catalogs(
        client: RedditClient,
        pain_points: SignalCatalog,
        opportunities: SignalCatalog,
        lexicon: SentimentLexicon,
    ) -> Self {
        Self {
            client,
            pain_matcher: SignalMatcher::new(pain_points),
            opportunity_matcher: SignalMatcher::new(opportunities),
            scorer: SentimentScorer::new(lexicon),
        }
    }

    pub fn client(&self) -> &RedditClient {
        &self.client
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    /// Scan the given communities in order. A failed fetch becomes an error
    /// marker on that community's entry; the loop always completes.
    pub async fn scan(&self, subreddits: &[String], options: &ScanOptions) -> ScanReport {
        let mut communities = Vec::with_capacity(subreddits.len());

        for (index, subreddit) in subreddits.iter().enumerate() {
            if index > 0 {
                pause_between_requests().await;
            }

            let scan = match self
                .client
                .fetch_page(subreddit, options.sort, options.limit)
                .await
            {
                Ok(posts) => self.analyze_community(subreddit, posts, options),
                Err(e) => {
                    warn!("Scan of r/{} failed: {}", subreddit, e);
                    CommunityScan::failed(subreddit, e.to_string())
                }
            };
            communities.push(scan);
        }

        let report = ScanReport {
            top_pain_points: top_matches(&communities, |c| &c.pain_points),
            top_opportunities: top_matches(&communities, |c| &c.opportunities),
            top_trending: top_posts(&communities),
            communities,
        };
        info!(
            "Scan finished: {} communities, {} aggregate pain points",
            report.communities.len(),
            report.top_pain_points.len()
        );
        report
    }

    /// Categorize and score one community's fetched page. Public so the
    /// search path can annotate results the same way.
    pub fn analyze_community(
        &self,
        subreddit: &str,
        posts: Vec<Post>,
        options: &ScanOptions,
    ) -> CommunityScan {
        let pain_points = self.annotate(&posts, &self.pain_matcher, options.with_sentiment);
        let opportunities =
            self.annotate(&posts, &self.opportunity_matcher, options.with_sentiment);
        let trending = select_trending(&posts, options.score_threshold);

        CommunityScan {
            subreddit: subreddit.to_string(),
            fetched: posts.len(),
            pain_points,
            opportunities,
            trending,
            error: None,
        }
    }

    fn annotate(
        &self,
        posts: &[Post],
        matcher: &SignalMatcher,
        with_sentiment: bool,
    ) -> Vec<SignalMatch> {
        posts
            .iter()
            .filter_map(|post| matcher.match_post(post))
            .map(|mut matched| {
                if with_sentiment {
                    let text = format!("{} {}", matched.post.title, matched.post.body);
                    matched.sentiment = Some(self.scorer.score(&text));
                }
                matched
            })
            .collect()
    }
}

/// Threshold rule: high score or a busy comment section. Stable sort keeps
/// the original fetch order between equal scores.
pub fn select_trending(posts: &[Post], score_threshold: i64) -> Vec<Post> {
    let mut trending: Vec<Post> = posts
        .iter()
        .filter(|p| p.score >= score_threshold || p.num_comments >= TRENDING_COMMENT_TRIGGER)
        .cloned()
        .collect();
    trending.sort_by(|a, b| b.score.cmp(&a.score));
    trending
}

fn top_matches(
    communities: &[CommunityScan],
    select: fn(&CommunityScan) -> &Vec<SignalMatch>,
) -> Vec<SignalMatch> {
    let mut all: Vec<SignalMatch> = communities
        .iter()
        .flat_map(|c| select(c).iter().cloned())
        .collect();
    all.sort_by(|a, b| b.post.score.cmp(&a.post.score));
    all.truncate(AGGREGATE_CAP);
    all
}

fn top_posts(communities: &[CommunityScan]) -> Vec<Post> {
    let mut all: Vec<Post> = communities
        .iter()
        .flat_map(|c| c.trending.iter().cloned())
        .collect();
    all.sort_by(|a, b| b.score.cmp(&a.score));
    all.truncate(AGGREGATE_CAP);
    all
}
