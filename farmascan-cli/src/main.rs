use anyhow::{bail, Result};
use clap::Parser;
use farmascan_common::observability::{init_logging, LogConfig};
use farmascan_common::FarmascanConfig;
use farmascan_web::browser::WebdriverCapturer;
use farmascan_web::compare_with;
use tracing::info;

/// Compare product prices across the five covered pharmacy storefronts and
/// print the merged records as JSON.
#[derive(Debug, Parser)]
#[command(name = "farmascan", version)]
struct Args {
    /// Search keyword, at least two characters after trimming.
    keyword: String,

    /// Per-site record cap (defaults to the configured cap).
    #[arg(long)]
    max_items: Option<usize>,

    /// Show the browser windows instead of running headless.
    #[arg(long)]
    no_headless: bool,

    /// WebDriver endpoint (overrides FARMASCAN_WEBDRIVER_URL).
    #[arg(long)]
    webdriver_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let keyword = args.keyword.trim();
    if keyword.chars().count() < 2 {
        bail!("keyword must have at least 2 characters");
    }

    let log_path = init_logging(LogConfig::default())?;
    info!(target: "cli", log = %log_path.display(), keyword, "starting search");

    let mut config = FarmascanConfig::from_env();
    if args.no_headless {
        config.headless = false;
    }
    if let Some(url) = args.webdriver_url {
        config.webdriver_url = url;
    }

    let max_items = args.max_items.unwrap_or(config.default_max_items);
    let capturer = WebdriverCapturer::new(config);
    let records = compare_with(&capturer, keyword, max_items).await;

    info!(target: "cli", total = records.len(), "search finished");
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
