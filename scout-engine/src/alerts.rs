//! The keyword-alert check cycle.

use crate::pause_between_requests;
use chrono::Utc;
use reddit_client::{RedditClient, SortOrder};
use redscout_core::{KeywordAlert, Post, PostSummary, ScoutError};
use serde::Serialize;
use std::collections::HashSet;
use storage::{AlertRegistry, JsonStore, SeenKey, SeenSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AlertMatch {
    pub alert_id: String,
    pub matched_keywords: Vec<String>,
    pub post: PostSummary,
}

/// Which of the alert's keywords occur in the post's lowercased title+body.
/// Plain substring matching; the alert registry stores keywords lowercased.
pub fn keyword_hits(alert: &KeywordAlert, post: &Post) -> Vec<String> {
    let haystack = format!("{} {}", post.title, post.body).to_lowercase();
    alert
        .keywords
        .iter()
        .filter(|keyword| haystack.contains(keyword.as_str()))
        .cloned()
        .collect()
}

/// One pass over every enabled alert. Reads the seen set but does not
/// mutate or persist anything durable itself: the new seen keys come back
/// to the caller, so the combined notify path can merge both branches'
/// additions before the single end-of-cycle write. Counter and timestamp
/// updates land on the in-memory registry.
pub async fn collect_alert_matches(
    registry: &mut AlertRegistry,
    seen: &SeenSet,
    client: &RedditClient,
    limit: u32,
) -> (Vec<AlertMatch>, Vec<SeenKey>) {
    let mut matches = Vec::new();
    let mut additions = Vec::new();
    // ids claimed earlier in this same cycle
    let mut fresh: HashSet<String> = HashSet::new();
    let mut fetches = 0u32;

    for alert in registry.enabled_mut() {
        let mut new_for_alert = 0u64;

        for subreddit in alert.subreddits.clone() {
            if fetches > 0 {
                pause_between_requests().await;
            }
            fetches += 1;

            let posts = match client.fetch_page(&subreddit, SortOrder::New, limit).await {
                Ok(posts) => posts,
                Err(e) => {
                    warn!(
                        "Alert {} fetch for r/{} failed, skipping: {}",
                        alert.id, subreddit, e
                    );
                    continue;
                }
            };

            for post in &posts {
                let hits = keyword_hits(alert, post);
                if hits.is_empty() {
                    continue;
                }
                let key = SeenKey::Keyword(post.id.clone());
                if seen.contains(&key) || !fresh.insert(key.render()) {
                    continue;
                }
                additions.push(key);
                new_for_alert += 1;
                matches.push(AlertMatch {
                    alert_id: alert.id.clone(),
                    matched_keywords: hits,
                    post: PostSummary::from(post),
                });
            }
        }

        alert.last_checked_at = Some(Utc::now());
        alert.match_count += new_for_alert;
        if new_for_alert > 0 {
            info!("Alert {} matched {} new posts", alert.id, new_for_alert);
        }
    }

    (matches, additions)
}

/// Standalone check cycle: collect, mark the survivors seen, then persist
/// the registry and the seen set exactly once.
pub async fn check_alerts(
    store: &JsonStore,
    registry: &mut AlertRegistry,
    seen: &mut SeenSet,
    client: &RedditClient,
    limit: u32,
) -> Result<Vec<AlertMatch>, ScoutError> {
    let (matches, additions) = collect_alert_matches(registry, seen, client, limit).await;
    for key in additions {
        seen.insert(key);
    }
    registry.save(store).await?;
    seen.flush(store).await?;
    Ok(matches)
}
