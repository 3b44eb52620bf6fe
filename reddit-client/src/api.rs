use redscout_core::{ApiError, Post, ScoutError, MAX_BODY_LEN};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REDDIT_PUBLIC_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Hot,
    New,
    Top,
    Rising,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
            SortOrder::Rising => "rising",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hot" => Ok(SortOrder::Hot),
            "new" => Ok(SortOrder::New),
            "top" => Ok(SortOrder::Top),
            "rising" => Ok(SortOrder::Rising),
            other => Err(ScoutError::invalid_input(format!(
                "unknown sort order '{}', expected hot|new|top|rising",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    // An empty string on leaf comments, a nested listing otherwise.
    #[serde(default)]
    pub replies: Value,
}

/// One comment from a flattened thread, annotated with its nesting depth.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadComment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: i64,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Thread {
    pub post: Post,
    pub comments: Vec<ThreadComment>,
}

#[derive(Debug)]
pub struct RedditClient {
    http_client: Client,
    base_url: String,
    user_agent: String,
}

impl RedditClient {
    pub fn new(user_agent: impl Into<String>) -> Self {
        let base = Url::parse(REDDIT_PUBLIC_BASE).expect("Base URL constant must parse");
        Self::with_base_url(user_agent, base)
    }

    /// Point the client at a different host. Used by tests against a local
    /// mock server and by self-hosted gateway setups.
    pub fn with_base_url(user_agent: impl Into<String>, base_url: Url) -> Self {
        let user_agent = user_agent.into();
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            user_agent,
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetch one page of posts for a subreddit. Non-success statuses are
    /// tolerated by returning an empty page; only transport-level failures
    /// surface as errors, for the caller's per-community handling.
    pub async fn fetch_page(
        &self,
        subreddit: &str,
        sort: SortOrder,
        limit: u32,
    ) -> Result<Vec<Post>, ScoutError> {
        let url = format!("{}/r/{}/{}.json", self.base_url, subreddit, sort.as_str());
        let mut params = vec![
            ("limit", limit.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if sort == SortOrder::Top {
            params.push(("t", "week".to_string()));
        }

        let listing = match self.get_listing(&url, &params, subreddit).await? {
            Some(listing) => listing,
            None => return Ok(Vec::new()),
        };

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        info!("Retrieved {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    /// Keyword search within one subreddit.
    pub async fn search_posts(
        &self,
        subreddit: &str,
        query: &str,
        sort: SortOrder,
        limit: u32,
    ) -> Result<Vec<Post>, ScoutError> {
        let url = format!("{}/r/{}/search.json", self.base_url, subreddit);
        let params = vec![
            ("q", query.to_string()),
            ("restrict_sr", "1".to_string()),
            ("sort", sort.as_str().to_string()),
            ("limit", limit.to_string()),
            ("raw_json", "1".to_string()),
        ];

        let listing = match self.get_listing(&url, &params, subreddit).await? {
            Some(listing) => listing,
            None => return Ok(Vec::new()),
        };

        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        info!(
            "Search '{}' returned {} posts from r/{}",
            query,
            posts.len(),
            subreddit
        );
        Ok(posts)
    }

    /// Fetch a post with its comment tree flattened into depth-annotated,
    /// depth-first order.
    pub async fn fetch_thread(
        &self,
        subreddit: &str,
        article_id: &str,
        limit: u32,
    ) -> Result<Thread, ScoutError> {
        let url = format!(
            "{}/r/{}/comments/{}.json",
            self.base_url, subreddit, article_id
        );
        let params = vec![("limit", limit.to_string()), ("raw_json", "1".to_string())];

        let response = self.send_get(&url, &params).await?;
        if !response.status().is_success() {
            return Err(ScoutError::not_found(format!(
                "thread {} in r/{}",
                article_id, subreddit
            )));
        }

        let payload: Vec<Value> = response.json().await.map_err(|e| {
            warn!("Failed to parse thread payload: {}", e);
            ScoutError::Api(ApiError::InvalidResponse {
                details: format!("Failed to parse thread {} in r/{}", article_id, subreddit),
            })
        })?;

        let post_data = payload
            .first()
            .and_then(|listing| listing.pointer("/data/children/0/data"))
            .cloned()
            .ok_or_else(|| {
                ScoutError::Api(ApiError::InvalidResponse {
                    details: format!("Thread {} payload is missing the post", article_id),
                })
            })?;
        let post_data: RedditPostData = serde_json::from_value(post_data).map_err(|e| {
            warn!("Failed to decode thread post: {}", e);
            ScoutError::Api(ApiError::InvalidResponse {
                details: format!("Thread {} post did not decode", article_id),
            })
        })?;

        let comments = payload
            .get(1)
            .map(flatten_comment_tree)
            .unwrap_or_default();

        debug!(
            "Retrieved thread {} with {} comments from r/{}",
            article_id,
            comments.len(),
            subreddit
        );

        Ok(Thread {
            post: post_data.into(),
            comments,
        })
    }

    async fn get_listing(
        &self,
        url: &str,
        params: &[(&str, String)],
        subreddit: &str,
    ) -> Result<Option<RedditListing<RedditPostData>>, ScoutError> {
        let response = self.send_get(url, params).await?;
        let status = response.status();

        if !status.is_success() {
            warn!(
                "Request for r/{} returned status {}, treating as empty page",
                subreddit, status
            );
            return Ok(None);
        }

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            warn!("Failed to parse listing for r/{}: {}", subreddit, e);
            ScoutError::Api(ApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        Ok(Some(listing))
    }

    async fn send_get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, ScoutError> {
        debug!("GET {}", url);
        self.http_client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScoutError::Api(ApiError::RequestTimeout)
                } else {
                    ScoutError::Network(e)
                }
            })
    }
}

impl From<RedditPostData> for Post {
    fn from(data: RedditPostData) -> Self {
        let body: String = data.selftext.chars().take(MAX_BODY_LEN).collect();
        let permalink = if data.permalink.starts_with('/') {
            format!("{}{}", REDDIT_PUBLIC_BASE, data.permalink)
        } else {
            data.permalink
        };

        Self {
            id: data.id,
            title: data.title,
            body,
            score: data.score,
            num_comments: data.num_comments,
            author: data.author,
            created_utc: data.created_utc as i64,
            permalink,
            subreddit: data.subreddit,
        }
    }
}

/// Flatten a comment listing depth-first with an explicit stack. Reddit
/// threads nest arbitrarily deep, so recursion is avoided on purpose.
/// "more" stubs and other non-comment children are skipped.
fn flatten_comment_tree(listing: &Value) -> Vec<ThreadComment> {
    let mut flattened = Vec::new();
    let mut stack: Vec<(Value, u32)> = Vec::new();
    push_children(listing, 0, &mut stack);

    while let Some((child, depth)) = stack.pop() {
        let kind = child.get("kind").and_then(Value::as_str).unwrap_or("");
        if kind != "t1" {
            continue;
        }
        let data = match child.get("data") {
            Some(data) => data,
            None => continue,
        };
        let comment: RedditCommentData = match serde_json::from_value(data.clone()) {
            Ok(comment) => comment,
            Err(e) => {
                debug!("Skipping undecodable comment node: {}", e);
                continue;
            }
        };

        if comment.replies.is_object() {
            push_children(&comment.replies, depth + 1, &mut stack);
        }

        flattened.push(ThreadComment {
            id: comment.id,
            author: comment.author,
            body: comment.body,
            score: comment.score,
            created_utc: comment.created_utc as i64,
            depth,
        });
    }

    flattened
}

/// Push a listing's children in reverse so the stack pops them in their
/// original sibling order.
fn push_children(listing: &Value, depth: u32, stack: &mut Vec<(Value, u32)>) {
    if let Some(children) = listing
        .pointer("/data/children")
        .and_then(Value::as_array)
    {
        for child in children.iter().rev() {
            stack.push((child.clone(), depth));
        }
    }
}
