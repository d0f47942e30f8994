use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use audience_diversity::{
    Config, DiversityContext, DiversityScorer, PassthroughUnshortener, Platform, Post, ScoreSource,
    Unshortener,
};
use topic_client::TopicClient;
use unshorten_client::UnshortenClient;

/// Score social media posts by the audience diversity of what they link to
/// or talk about.
#[derive(Parser)]
#[command(name = "audience-diversity")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score posts read as a JSON array or JSON Lines
    Score {
        /// Platform the posts come from (twitter, reddit, other)
        #[arg(short, long)]
        platform: Platform,

        /// Input file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Score each post on its own instead of as one batch
        #[arg(long)]
        single: bool,

        /// Treat links as already expanded
        #[arg(long)]
        skip_unshorten: bool,
    },

    /// Load the diversity tables and report their sizes
    Check,
}

#[derive(Serialize)]
struct ScoreLine {
    index: usize,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<ScoreSource>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("audience_diversity=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.log_redacted();
    let context = Arc::new(DiversityContext::load(&config)?);

    match cli.command {
        Commands::Check => {
            println!(
                "domains: {}\ntopics: {}",
                context.domains.len(),
                context.topics.len()
            );
            Ok(())
        }
        Commands::Score {
            platform,
            input,
            single,
            skip_unshorten,
        } => {
            let posts = read_posts(input.as_ref())?;
            let scorer = build_scorer(&config, context, skip_unshorten)?;
            score_posts(&scorer, &posts, platform, single).await
        }
    }
}

fn build_scorer(config: &Config, context: Arc<DiversityContext>, skip_unshorten: bool) -> Result<DiversityScorer> {
    let topic_url = config
        .topic_service_url
        .as_deref()
        .context("TOPIC_SERVICE_URL environment variable is required for scoring")?;
    let classifier = TopicClient::new(topic_url, Duration::from_secs(config.topic_timeout_secs))?;

    let unshortener: Arc<dyn Unshortener> = if skip_unshorten {
        Arc::new(PassthroughUnshortener)
    } else {
        Arc::new(UnshortenClient::new(Duration::from_secs(config.unshorten_timeout_secs))?)
    };

    Ok(DiversityScorer::new(context, unshortener, Arc::new(classifier)))
}

async fn score_posts(scorer: &DiversityScorer, posts: &[Post], platform: Platform, single: bool) -> Result<()> {
    info!(posts = posts.len(), %platform, single, "Scoring posts");

    let lines: Vec<ScoreLine> = if single {
        let mut lines = Vec::with_capacity(posts.len());
        for (index, post) in posts.iter().enumerate() {
            let score = scorer.score_single(post, platform).await;
            lines.push(ScoreLine {
                index,
                score,
                source: None,
            });
        }
        lines
    } else {
        let scores = scorer.score_batch_with_sources(posts, platform).await;
        scores
            .into_iter()
            .enumerate()
            .map(|(index, s)| ScoreLine {
                index,
                score: s.score,
                source: Some(s.source),
            })
            .collect()
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in &lines {
        serde_json::to_writer(&mut out, line)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

fn read_posts(input: Option<&PathBuf>) -> Result<Vec<Post>> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            buf
        }
    };
    parse_posts(&raw)
}

/// Posts as a JSON array, or one JSON object per line. Blank lines are
/// skipped; line numbers in errors count them.
fn parse_posts(raw: &str) -> Result<Vec<Post>> {
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(raw).context("Invalid JSON array of posts");
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid post on line {}", i + 1))
        })
        .collect()
}
