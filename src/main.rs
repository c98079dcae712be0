mod api_types;
mod cluster;
mod ctr;
mod fetch;
mod import;
mod metrics;
mod models;
mod orchestrator;
mod projection;
mod report;
mod similarity;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::info;

use orchestrator::{run_research, ResearchOptions};

/// keywordscope - SEO keyword metrics, funnel projection and clustering
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Keyword CSV export (SEMrush-style; comma, semicolon or TAB delimited)
    input: String,

    /// Business context JSON (conversion rate, AOV, sessions, goal)
    #[arg(short, long)]
    context: Option<String>,

    /// Classifier webhook endpoint (overrides KEYWORDSCOPE_ANALYSIS_URL)
    #[arg(long)]
    analysis_url: Option<String>,

    /// Classifier results from a local JSON file instead of the webhook
    #[arg(long, conflicts_with = "analysis_url")]
    analysis_file: Option<String>,

    /// Auto-suggest rows as a JSON array
    #[arg(long)]
    suggest_file: Option<String>,

    /// Output directory for generated files
    #[arg(short, long, default_value = "out")]
    output_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    info!("Starting keywordscope");

    let args = Args::parse();

    let analysis_url = args
        .analysis_url
        .or_else(|| std::env::var("KEYWORDSCOPE_ANALYSIS_URL").ok());

    let ymd = Local::now().format("%Y-%m-%d").to_string();

    let opts = ResearchOptions {
        csv_path: args.input,
        context_path: args.context,
        analysis_url,
        analysis_file: args.analysis_file,
        suggest_file: args.suggest_file,
        output_dir: args.output_dir,
    };

    run_research(&opts, &ymd).await
}
