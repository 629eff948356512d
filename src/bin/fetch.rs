use anyhow::Context;
use clap::Parser;
use macro_dashboard::fetcher::fred::{FredClient, DEFAULT_API_BASE};
use macro_dashboard::{run_fetch, FetchPlan};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetch")]
struct Args {
    /// FRED API key.
    #[arg(long, env = "FRED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "MACRO_DATA_DIR", default_value = "web/public/data")]
    out_dir: PathBuf,

    #[arg(long, env = "FRED_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Checked before anything touches the network or the output directory.
    let client = FredClient::new(&args.api_base, args.api_key).context("fetcher configuration")?;

    let plan = FetchPlan::default();
    let report = run_fetch(&client, &plan, &args.out_dir, chrono::Utc::now())
        .await
        .with_context(|| format!("fetching into {}", args.out_dir.display()))?;

    tracing::info!(changed = report.changed(), series = report.series.len(), "fetch complete");
    Ok(())
}
