//! Notification rendering and the combined notify cycle.

use crate::alerts::{collect_alert_matches, AlertMatch};
use crate::competitors::{collect_competitor_mentions, CompetitorMention, CompetitorReport};
use crate::scan::ScanEngine;
use redscout_core::{CompetitorConfig, ScoutError};
use serde::Serialize;
use storage::{AlertRegistry, JsonStore, SeenSet};
use tracing::info;

/// Message bounds; anything beyond is summarized as "...and N more".
pub const MAX_KEYWORD_LINES: usize = 5;
pub const MAX_COMPETITOR_LINES: usize = 3;

#[derive(Debug, Serialize)]
pub struct NotifyReport {
    pub keyword_matches: Vec<AlertMatch>,
    pub competitors: CompetitorReport,
    pub message: String,
}

/// Render the cycle's findings into a compact delivery-channel message.
/// Empty input renders an empty message.
pub fn render_notification(
    matches: &[AlertMatch],
    mentions: &[CompetitorMention],
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !matches.is_empty() {
        lines.push(format!("New keyword matches ({}):", matches.len()));
        for m in matches.iter().take(MAX_KEYWORD_LINES) {
            lines.push(format!(
                "- [r/{}] {} (keywords: {}) {}",
                m.post.subreddit,
                m.post.title,
                m.matched_keywords.join(", "),
                m.post.permalink
            ));
        }
        if matches.len() > MAX_KEYWORD_LINES {
            lines.push(format!("...and {} more", matches.len() - MAX_KEYWORD_LINES));
        }
    }

    if !mentions.is_empty() {
        lines.push(format!("Competitor mentions ({}):", mentions.len()));
        for m in mentions.iter().take(MAX_COMPETITOR_LINES) {
            lines.push(format!(
                "- [r/{}] {}: \"{}\" {}",
                m.post.subreddit, m.competitor, m.context, m.post.permalink
            ));
        }
        if mentions.len() > MAX_COMPETITOR_LINES {
            lines.push(format!(
                "...and {} more",
                mentions.len() - MAX_COMPETITOR_LINES
            ));
        }
    }

    lines.join("\n")
}

/// The combined notify path. The keyword and competitor checks run
/// concurrently over one loaded view of the seen set; their key prefixes
/// are disjoint, so the only shared write is the final save. Both branches'
/// additions merge in memory here and the set is persisted exactly once,
/// never through two independent read-modify-write cycles.
pub async fn run_notify_cycle(
    store: &JsonStore,
    engine: &ScanEngine,
    registry: &mut AlertRegistry,
    competitor_config: &CompetitorConfig,
    seen: &mut SeenSet,
    limit: u32,
) -> Result<NotifyReport, ScoutError> {
    let seen_view: &SeenSet = seen;
    let ((keyword_matches, keyword_keys), (competitors, competitor_keys)) = tokio::join!(
        collect_alert_matches(registry, seen_view, engine.client(), limit),
        collect_competitor_mentions(
            competitor_config,
            seen_view,
            engine.client(),
            engine.scorer(),
            limit
        ),
    );

    for key in keyword_keys.into_iter().chain(competitor_keys) {
        seen.insert(key);
    }

    registry.save(store).await?;
    seen.flush(store).await?;

    let message = render_notification(&keyword_matches, &competitors.mentions);
    info!(
        "Notify cycle complete: {} keyword matches, {} competitor mentions",
        keyword_matches.len(),
        competitors.mentions.len()
    );

    Ok(NotifyReport {
        keyword_matches,
        competitors,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use redscout_core::{PostSummary, Sentiment};

    fn summary(id: &str, title: &str) -> PostSummary {
        PostSummary {
            id: id.to_string(),
            title: title.to_string(),
            subreddit: "SaaS".to_string(),
            score: 1,
            num_comments: 0,
            permalink: format!("https://www.reddit.com/r/SaaS/comments/{}/", id),
        }
    }

    fn keyword_match(id: &str) -> AlertMatch {
        AlertMatch {
            alert_id: "alert-1".to_string(),
            matched_keywords: vec!["crm".to_string()],
            post: summary(id, "A CRM question"),
        }
    }

    fn mention(id: &str) -> CompetitorMention {
        CompetitorMention {
            competitor: "bigcrm".to_string(),
            context: "thinking about bigcrm for this".to_string(),
            sentiment: Sentiment::neutral(),
            post: summary(id, "Tool thread"),
        }
    }

    #[test]
    fn empty_cycle_renders_an_empty_message() {
        assert_eq!(render_notification(&[], &[]), "");
    }

    #[test]
    fn keyword_matches_are_capped_with_a_tail() {
        let matches: Vec<AlertMatch> = (0..8).map(|i| keyword_match(&format!("p{}", i))).collect();
        let message = render_notification(&matches, &[]);

        assert!(message.starts_with("New keyword matches (8):"));
        assert_eq!(message.matches("- [r/SaaS]").count(), MAX_KEYWORD_LINES);
        assert!(message.ends_with("...and 3 more"));
    }

    #[test]
    fn competitor_mentions_are_capped_with_a_tail() {
        let mentions: Vec<CompetitorMention> =
            (0..5).map(|i| mention(&format!("p{}", i))).collect();
        let message = render_notification(&[], &mentions);

        assert!(message.contains("Competitor mentions (5):"));
        assert!(message.ends_with("...and 2 more"));
    }

    #[test]
    fn short_lists_have_no_tail() {
        let message = render_notification(&[keyword_match("p1")], &[mention("p2")]);
        assert!(!message.contains("more"));
        assert!(message.contains("New keyword matches (1):"));
        assert!(message.contains("Competitor mentions (1):"));
    }
}
