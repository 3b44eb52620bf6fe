use reddit_client::RedditClient;
use redscout_core::CompetitorConfig;
use scout_engine::{check_alerts, run_notify_cycle, ScanEngine, ScanOptions};
use serde_json::json;
use storage::{AlertRegistry, JsonStore, SeenKey, SeenSet};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_json(id: &str, title: &str, body: &str, score: i64, created_utc: i64) -> serde_json::Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": title,
            "selftext": body,
            "author": "someone",
            "subreddit": "SaaS",
            "permalink": format!("/r/SaaS/comments/{}/", id),
            "created_utc": created_utc as f64,
            "score": score,
            "num_comments": 3
        }
    })
}

fn listing(children: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "kind": "Listing", "data": { "children": children, "after": null, "before": null } })
}

fn client_for(server: &MockServer) -> RedditClient {
    RedditClient::with_base_url("redscout-tests/0.1", Url::parse(&server.uri()).unwrap())
}

#[tokio::test]
async fn scan_categorizes_scores_and_selects_trending() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/SaaS/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post_json(
                "p1",
                "Looking for a CRM alternative",
                "BigCRM is too expensive and I hate the bugs",
                120,
                1_700_000_000,
            ),
            post_json("p2", "Weekly wins thread", "share your wins", 10, 1_700_000_000),
        ])))
        .mount(&server)
        .await;

    let engine = ScanEngine::new(client_for(&server));
    let report = engine
        .scan(&["SaaS".to_string()], &ScanOptions::default())
        .await;

    assert_eq!(report.communities.len(), 1);
    let community = &report.communities[0];
    assert_eq!(community.fetched, 2);
    assert!(community.error.is_none());

    // p1 matches help_seeking and pricing; p2 matches nothing
    assert_eq!(community.pain_points.len(), 1);
    let matched = &community.pain_points[0];
    assert_eq!(matched.post.id, "p1");
    assert!(matched.categories.contains_key("help_seeking"));
    assert!(matched.categories.contains_key("pricing"));
    let sentiment = matched.sentiment.as_ref().unwrap();
    assert!(sentiment.negative_hits > 0);

    // only p1 clears the default score threshold
    assert_eq!(community.trending.len(), 1);
    assert_eq!(community.trending[0].id, "p1");
    assert_eq!(report.top_trending.len(), 1);
}

#[tokio::test]
async fn scan_records_error_markers_and_completes() {
    let server = MockServer::start().await;
    let engine = ScanEngine::new(client_for(&server));
    drop(server);

    let report = engine
        .scan(
            &["SaaS".to_string(), "startups".to_string()],
            &ScanOptions::default(),
        )
        .await;

    assert_eq!(report.communities.len(), 2);
    for community in &report.communities {
        assert!(community.error.is_some());
        assert_eq!(community.fetched, 0);
    }
    assert!(report.top_pain_points.is_empty());
}

#[tokio::test]
async fn alert_check_deduplicates_across_cycles() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/SaaS/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post_json(
                "abc123",
                "Looking for a CRM alternative",
                "",
                15,
                1_700_000_000,
            ),
            post_json("zzz999", "Unrelated post", "", 5, 1_700_000_000),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    let client = client_for(&server);

    let mut registry = AlertRegistry::default();
    registry
        .add(
            vec!["looking for".to_string(), "need help".to_string()],
            vec!["SaaS".to_string()],
        )
        .unwrap();
    let mut seen = SeenSet::load(&store).await;

    let matches = check_alerts(&store, &mut registry, &mut seen, &client, 25)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].post.id, "abc123");
    assert_eq!(matches[0].matched_keywords, vec!["looking for"]);
    assert!(seen.contains(&SeenKey::Keyword("abc123".to_string())));
    assert_eq!(registry.list()[0].match_count, 1);
    assert!(registry.list()[0].last_checked_at.is_some());

    // second cycle over the same fetched data: nothing new
    let matches = check_alerts(&store, &mut registry, &mut seen, &client, 25)
        .await
        .unwrap();
    assert!(matches.is_empty());
    assert_eq!(registry.list()[0].match_count, 1);

    // and the dedup state survives a reload
    let reloaded = SeenSet::load(&store).await;
    assert!(reloaded.contains(&SeenKey::Keyword("abc123".to_string())));
}

#[tokio::test]
async fn notify_cycle_merges_both_branches_into_one_seen_write() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/SaaS/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post_json(
                "kw1",
                "Need help picking a tool",
                "also wondering about BigCRM pricing",
                8,
                1_700_000_000,
            ),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).await.unwrap();
    let engine = ScanEngine::new(client_for(&server));

    let mut registry = AlertRegistry::default();
    registry
        .add(vec!["need help".to_string()], vec!["SaaS".to_string()])
        .unwrap();
    let competitor_config = CompetitorConfig {
        competitors: vec!["BigCRM".to_string()],
        subreddits: vec!["SaaS".to_string()],
    };
    let mut seen = SeenSet::load(&store).await;

    let report = run_notify_cycle(
        &store,
        &engine,
        &mut registry,
        &competitor_config,
        &mut seen,
        25,
    )
    .await
    .unwrap();

    assert_eq!(report.keyword_matches.len(), 1);
    assert_eq!(report.competitors.mentions.len(), 1);
    assert!(report.message.contains("New keyword matches (1):"));
    assert!(report.message.contains("Competitor mentions (1):"));

    // one post, two namespaces, both durable after the single flush
    let reloaded = SeenSet::load(&store).await;
    assert!(reloaded.contains(&SeenKey::Keyword("kw1".to_string())));
    assert!(reloaded.contains(&SeenKey::Competitor("kw1".to_string())));

    // a second combined cycle is quiet
    let report = run_notify_cycle(
        &store,
        &engine,
        &mut registry,
        &competitor_config,
        &mut seen,
        25,
    )
    .await
    .unwrap();
    assert!(report.keyword_matches.is_empty());
    assert!(report.competitors.mentions.is_empty());
    assert_eq!(report.message, "");
}

#[tokio::test]
async fn digest_windows_posts_and_counts_categories() {
    let server = MockServer::start().await;
    let now = chrono::Utc::now().timestamp();

    Mock::given(method("GET"))
        .and(path("/r/SaaS/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post_json(
                "recent",
                "Looking for a CRM, current one is too expensive",
                "",
                40,
                now - 3600,
            ),
            post_json("stale", "Looking for feedback", "", 90, now - 48 * 3600),
            post_json("plain", "Morning thread", "", 2, now - 600),
        ])))
        .mount(&server)
        .await;

    let engine = ScanEngine::new(client_for(&server));
    let digest = engine.build_digest(&["SaaS".to_string()], 24).await;

    // the 48h-old post falls outside the 24h window
    assert_eq!(digest.totals.post_count, 2);
    assert_eq!(digest.window, "last 24 hours");

    // category counts come from pain-point matches only
    assert_eq!(digest.totals.categories.get("help_seeking"), Some(&1));
    assert_eq!(digest.totals.categories.get("pricing"), Some(&1));

    // sentiment denominator is the matched post, not the whole window
    let sentiment = &digest.totals.sentiment_over_pain_points;
    assert_eq!(sentiment.positive + sentiment.negative + sentiment.neutral, 1);

    assert_eq!(digest.communities.len(), 1);
    let breakdown = &digest.communities[0];
    assert_eq!(breakdown.post_count, 2);
    assert_eq!(breakdown.pain_point_count, 1);

    // engagement ranking: recent = 40 + 2*3 = 46, plain = 2 + 6 = 8
    assert_eq!(digest.top_posts.len(), 2);
    assert_eq!(digest.top_posts[0].post.id, "recent");
    assert_eq!(digest.top_posts[0].engagement, 46);
}
