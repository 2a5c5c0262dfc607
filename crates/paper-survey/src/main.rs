//! Paper Survey - Entry Point
//!
//! Runs one survey for a topic and prints it as Markdown or JSON.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_survey::config::Config;
use paper_survey::fetch::DiskCache;
use paper_survey::formatters::{format_outcome_json, format_survey_markdown};
use paper_survey::pipeline::SurveyPipeline;

#[derive(Parser, Debug)]
#[command(name = "paper-survey")]
#[command(about = "Generate a literature survey from arXiv and Semantic Scholar")]
#[command(version)]
struct Cli {
    /// Research topic
    #[arg(required_unless_present = "clear_cache")]
    topic: Option<String>,

    /// Number of papers to summarize
    #[arg(long, env = "PAPER_SURVEY_TOP_K")]
    top_k: Option<usize>,

    /// Records requested from each source
    #[arg(long, env = "PAPER_SURVEY_MAX_PER_SOURCE")]
    max_per_source: Option<usize>,

    /// Directory for cached PDFs and extracted text
    #[arg(long, env = "PAPER_SURVEY_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Only keep papers that have a PDF link
    #[arg(long)]
    require_pdf: bool,

    /// Whole-run timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, default_value = "markdown")]
    format: OutputFormat,

    /// Write the result to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Remove cached PDFs and text before running (or alone, without a topic)
    #[arg(long)]
    clear_cache: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Survey followed by a reference list
    #[default]
    Markdown,
    /// Machine-readable outcome
    Json,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting paper survey");

    let mut config = Config::from_env()?;
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
        config.candidate_pool = config.candidate_pool.max(top_k);
    }
    if let Some(n) = cli.max_per_source {
        config.max_results_per_source = n;
    }
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(secs) = cli.timeout_secs {
        config.run_timeout = std::time::Duration::from_secs(secs);
    }
    config.require_pdf |= cli.require_pdf;

    if cli.clear_cache {
        let removed = DiskCache::new(config.cache_dir.clone()).clear().await?;
        tracing::info!(removed, "Cache cleared");
    }

    let Some(topic) = cli.topic else {
        return Ok(());
    };

    let pipeline = SurveyPipeline::builder(config).build()?;
    let outcome = match pipeline.run(&topic).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e.to_user_message());
            return Err(e.into());
        }
    };

    let rendered = match cli.format {
        OutputFormat::Markdown => format_survey_markdown(&outcome),
        OutputFormat::Json => serde_json::to_string_pretty(&format_outcome_json(&outcome))?,
    };

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, rendered).await?;
            tracing::info!(path = %path.display(), "Survey written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
