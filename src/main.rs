use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use redscout_core::{CompetitorConfig, ScoutError};
use reddit_client::{RedditClient, SortOrder};
use scout_engine::{
    check_alerts, check_competitors, run_notify_cycle, store_digest, to_csv, ScanEngine,
    ScanOptions, DEFAULT_SCORE_THRESHOLD,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use storage::{AlertRegistry, JsonStore, ScheduleTracker, SeenSet, COMPETITORS_DOC};
use url::Url;

const USER_AGENT: &str = "redscout/0.1 (community listening)";

#[derive(Parser)]
#[command(name = "redscout")]
#[command(about = "Social listening scout for Reddit communities")]
struct Cli {
    /// Directory holding alerts, seen state and snapshots
    #[arg(long, env = "REDSCOUT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Override the source API base URL
    #[arg(long, env = "REDSCOUT_BASE_URL", global = true)]
    base_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct FetchArgs {
    /// Posts to fetch per community
    #[arg(long, default_value_t = 25)]
    limit: u32,

    /// Listing sort: hot|new|top|rising
    #[arg(long, default_value = "hot")]
    sort: String,
}

#[derive(Subcommand)]
enum Command {
    /// Scan one subreddit for pain points, opportunities and trending posts
    Scan {
        subreddit: String,
        #[command(flatten)]
        fetch: FetchArgs,
        #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
        score_threshold: i64,
        /// Skip sentiment scoring
        #[arg(long)]
        no_sentiment: bool,
    },
    /// Search within a subreddit and annotate the results
    Search {
        subreddit: String,
        query: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Pain-point matches only, for one subreddit
    Pain {
        subreddit: String,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Fetch a post with its comment tree flattened
    Thread {
        subreddit: String,
        article_id: String,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Scan several subreddits and aggregate across them
    Multi {
        #[arg(required = true)]
        subreddits: Vec<String>,
        #[command(flatten)]
        fetch: FetchArgs,
        #[arg(long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
        score_threshold: i64,
        #[arg(long)]
        no_sentiment: bool,
    },
    /// Check configured competitors for new mentions
    Competitors {
        #[arg(long, default_value_t = 25)]
        limit: u32,
    },
    /// Build a windowed digest across subreddits
    Digest {
        #[arg(required = true)]
        subreddits: Vec<String>,
        #[arg(long, default_value_t = 24)]
        window_hours: i64,
    },
    /// Scan and write the pain-point matches to a CSV file
    Export {
        #[arg(required = true)]
        subreddits: Vec<String>,
        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Run the keyword-alert and competitor checks together
    Notify {
        #[arg(long, default_value_t = 25)]
        limit: u32,
    },
    /// Manage scheduled posts
    #[command(subcommand)]
    Post(PostCommand),
    /// Manage keyword alerts
    #[command(subcommand)]
    Alert(AlertCommand),
}

#[derive(Subcommand)]
enum PostCommand {
    /// Queue a post for manual publishing
    Add {
        subreddit: String,
        title: String,
        /// Body text
        #[arg(long, default_value = "")]
        content: String,
        /// When to post, RFC 3339 (e.g. 2026-08-05T09:00:00Z)
        #[arg(long)]
        at: DateTime<Utc>,
    },
    /// List scheduled posts
    List,
    /// Pending posts whose scheduled time has arrived
    Due,
    /// Cancel a pending post
    Cancel { id: String },
    /// Record that a pending post was published
    MarkPosted {
        id: String,
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand)]
enum AlertCommand {
    /// Register a keyword alert
    Add {
        /// Comma-separated keywords
        #[arg(long, required = true, value_delimiter = ',')]
        keywords: Vec<String>,
        /// Comma-separated subreddits
        #[arg(long, required = true, value_delimiter = ',')]
        subreddits: Vec<String>,
    },
    /// List registered alerts
    List,
    /// Run one check cycle over every enabled alert
    Check {
        #[arg(long, default_value_t = 25)]
        limit: u32,
    },
    Enable { id: String },
    Disable { id: String },
    Remove { id: String },
}

#[tokio::main]
async fn main() {
    // stdout is reserved for the JSON document; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting redscout");

    match run(cli).await {
        Ok(document) => {
            let rendered =
                serde_json::to_string_pretty(&document).expect("JSON document must serialize");
            println!("{}", rendered);
        }
        Err(e) if e.is_usage_error() => {
            let rendered = serde_json::to_string_pretty(&json!({ "error": e.to_string() }))
                .expect("JSON document must serialize");
            println!("{}", rendered);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<Value, ScoutError> {
    let client = match &cli.base_url {
        Some(base) => RedditClient::with_base_url(USER_AGENT, base.clone()),
        None => RedditClient::new(USER_AGENT),
    };
    let data_dir = resolve_data_dir(&cli);

    match cli.command {
        Command::Scan {
            subreddit,
            fetch,
            score_threshold,
            no_sentiment,
        } => {
            let options = scan_options(&fetch, score_threshold, no_sentiment)?;
            let engine = ScanEngine::new(client);
            let report = engine.scan(&[subreddit], &options).await;
            Ok(serde_json::to_value(&report.communities[0])?)
        }
        Command::Search {
            subreddit,
            query,
            fetch,
        } => {
            let options = scan_options(&fetch, DEFAULT_SCORE_THRESHOLD, false)?;
            let engine = ScanEngine::new(client);
            let posts = engine
                .client()
                .search_posts(&subreddit, &query, options.sort, options.limit)
                .await?;
            let analyzed = engine.analyze_community(&subreddit, posts, &options);
            Ok(json!({
                "subreddit": analyzed.subreddit.clone(),
                "query": query,
                "fetched": analyzed.fetched,
                "pain_points": serde_json::to_value(&analyzed.pain_points)?,
                "opportunities": serde_json::to_value(&analyzed.opportunities)?,
            }))
        }
        Command::Pain { subreddit, fetch } => {
            let options = scan_options(&fetch, DEFAULT_SCORE_THRESHOLD, false)?;
            let engine = ScanEngine::new(client);
            let report = engine.scan(&[subreddit], &options).await;
            let community = &report.communities[0];
            Ok(json!({
                "subreddit": community.subreddit.clone(),
                "fetched": community.fetched,
                "pain_points": serde_json::to_value(&community.pain_points)?,
                "error": community.error.clone(),
            }))
        }
        Command::Thread {
            subreddit,
            article_id,
            limit,
        } => {
            let thread = client.fetch_thread(&subreddit, &article_id, limit).await?;
            Ok(serde_json::to_value(&thread)?)
        }
        Command::Multi {
            subreddits,
            fetch,
            score_threshold,
            no_sentiment,
        } => {
            let options = scan_options(&fetch, score_threshold, no_sentiment)?;
            let engine = ScanEngine::new(client);
            let report = engine.scan(&subreddits, &options).await;
            Ok(serde_json::to_value(&report)?)
        }
        Command::Competitors { limit } => {
            let store = JsonStore::open(&data_dir).await?;
            let config: CompetitorConfig =
                store.load_or(COMPETITORS_DOC, CompetitorConfig::default()).await;
            if config.competitors.is_empty() || config.subreddits.is_empty() {
                return Err(ScoutError::invalid_input(format!(
                    "no competitor configuration; put competitors and subreddits in {}",
                    store.path_for(COMPETITORS_DOC).display()
                )));
            }

            let engine = ScanEngine::new(client);
            let mut seen = SeenSet::load(&store).await;
            let report = check_competitors(
                &store,
                &config,
                &mut seen,
                engine.client(),
                engine.scorer(),
                limit,
            )
            .await?;
            Ok(serde_json::to_value(&report)?)
        }
        Command::Digest {
            subreddits,
            window_hours,
        } => {
            if window_hours <= 0 {
                return Err(ScoutError::invalid_input(
                    "window-hours must be a positive number",
                ));
            }
            let store = JsonStore::open(&data_dir).await?;
            let engine = ScanEngine::new(client);
            let digest = engine.build_digest(&subreddits, window_hours).await;
            store_digest(&store, &digest).await?;
            Ok(serde_json::to_value(&digest)?)
        }
        Command::Export {
            subreddits,
            out,
            fetch,
        } => {
            let options = scan_options(&fetch, DEFAULT_SCORE_THRESHOLD, false)?;
            let engine = ScanEngine::new(client);
            let report = engine.scan(&subreddits, &options).await;

            let records: Vec<Value> = report
                .communities
                .iter()
                .flat_map(|c| c.pain_points.iter())
                .map(|m| {
                    json!({
                        "id": m.post.id.clone(),
                        "subreddit": m.post.subreddit.clone(),
                        "title": m.post.title.clone(),
                        "score": m.post.score,
                        "num_comments": m.post.num_comments,
                        "matched_signals": m.matched_signals.join("; "),
                        "categories": m.categories.keys().cloned().collect::<Vec<_>>().join("; "),
                        "sentiment": m.sentiment.as_ref().map(|s| format!("{:?}", s.label).to_lowercase()),
                        "permalink": m.post.permalink.clone(),
                    })
                })
                .collect();

            let csv = to_csv(&records, None);
            tokio::fs::write(&out, csv).await?;
            Ok(json!({ "exported": records.len(), "path": out.display().to_string() }))
        }
        Command::Notify { limit } => {
            let store = JsonStore::open(&data_dir).await?;
            let engine = ScanEngine::new(client);
            let mut registry = AlertRegistry::load(&store).await;
            let config: CompetitorConfig =
                store.load_or(COMPETITORS_DOC, CompetitorConfig::default()).await;
            let mut seen = SeenSet::load(&store).await;

            let report = run_notify_cycle(
                &store,
                &engine,
                &mut registry,
                &config,
                &mut seen,
                limit,
            )
            .await?;
            Ok(serde_json::to_value(&report)?)
        }
        Command::Post(post_command) => {
            let store = JsonStore::open(&data_dir).await?;
            let mut tracker = ScheduleTracker::load(&store).await;
            run_post_command(post_command, &store, &mut tracker).await
        }
        Command::Alert(alert_command) => {
            let store = JsonStore::open(&data_dir).await?;
            let mut registry = AlertRegistry::load(&store).await;
            run_alert_command(alert_command, &store, &mut registry, &client).await
        }
    }
}

async fn run_post_command(
    command: PostCommand,
    store: &JsonStore,
    tracker: &mut ScheduleTracker,
) -> Result<Value, ScoutError> {
    match command {
        PostCommand::Add {
            subreddit,
            title,
            content,
            at,
        } => {
            let post = tracker.add(subreddit, title, content, at)?.clone();
            tracker.save(store).await?;
            Ok(serde_json::to_value(&post)?)
        }
        PostCommand::List => Ok(json!({
            "scheduled": serde_json::to_value(tracker.list())?,
            "posted": serde_json::to_value(tracker.history())?,
        })),
        PostCommand::Due => {
            let due = tracker.due_now(Utc::now());
            Ok(json!({ "due": serde_json::to_value(&due)? }))
        }
        PostCommand::Cancel { id } => {
            let post = tracker.cancel(&id, Utc::now())?.clone();
            tracker.save(store).await?;
            Ok(serde_json::to_value(&post)?)
        }
        PostCommand::MarkPosted { id, url } => {
            let post = tracker.mark_posted(&id, url, Utc::now())?;
            tracker.save(store).await?;
            Ok(serde_json::to_value(&post)?)
        }
    }
}

async fn run_alert_command(
    command: AlertCommand,
    store: &JsonStore,
    registry: &mut AlertRegistry,
    client: &RedditClient,
) -> Result<Value, ScoutError> {
    match command {
        AlertCommand::Add {
            keywords,
            subreddits,
        } => {
            let alert = registry.add(keywords, subreddits)?.clone();
            registry.save(store).await?;
            Ok(serde_json::to_value(&alert)?)
        }
        AlertCommand::List => Ok(json!({ "alerts": serde_json::to_value(registry.list())? })),
        AlertCommand::Check { limit } => {
            let mut seen = SeenSet::load(store).await;
            let matches = check_alerts(store, registry, &mut seen, client, limit).await?;
            Ok(json!({
                "new_matches": matches.len(),
                "matches": serde_json::to_value(&matches)?,
            }))
        }
        AlertCommand::Enable { id } => {
            let alert = registry.set_enabled(&id, true)?.clone();
            registry.save(store).await?;
            Ok(serde_json::to_value(&alert)?)
        }
        AlertCommand::Disable { id } => {
            let alert = registry.set_enabled(&id, false)?.clone();
            registry.save(store).await?;
            Ok(serde_json::to_value(&alert)?)
        }
        AlertCommand::Remove { id } => {
            let removed = registry.remove(&id)?;
            registry.save(store).await?;
            Ok(serde_json::to_value(&removed)?)
        }
    }
}

fn scan_options(
    fetch: &FetchArgs,
    score_threshold: i64,
    no_sentiment: bool,
) -> Result<ScanOptions, ScoutError> {
    Ok(ScanOptions {
        limit: fetch.limit,
        sort: fetch.sort.parse::<SortOrder>()?,
        score_threshold,
        with_sentiment: !no_sentiment,
    })
}

fn resolve_data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .map(|dir| dir.join("redscout"))
            .unwrap_or_else(|| PathBuf::from(".redscout"))
    })
}
