//! board-prices - AliExpress price tracker for supported mining boards.

use anyhow::Result;
use board_prices::commands::PricesCommand;
use board_prices::config::{Config, OutputFormat};
use board_prices::format::summary_table;
use board_prices::report::TracingReporter;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "board-prices",
    version,
    about = "Export AliExpress prices of the boards a GitHub README lists",
    long_about = "Reads the 'Current Supported Boards' section of a repository README, opens each \
                  board's AliExpress link through WebDriver (chromedriver on :9515 by default) and \
                  writes current and original prices to a timestamped spreadsheet."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// README page listing the boards
    #[arg(long, env = "BOARD_PRICES_SOURCE_URL")]
    source_url: Option<String>,

    /// WebDriver endpoint
    #[arg(long, env = "BOARD_PRICES_WEBDRIVER")]
    webdriver: Option<String>,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Proxy URL for the README fetch (e.g., socks5://host:port)
    #[arg(long, env = "BOARD_PRICES_PROXY")]
    proxy: Option<String>,

    /// Export format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Directory for the export file
    #[arg(short, long, env = "BOARD_PRICES_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of leading links that get the long cold-start timeouts
    #[arg(long)]
    warmup: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive("board_prices=info".parse()?)
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(url) = cli.source_url {
        config.source_url = url;
    }
    if let Some(webdriver) = cli.webdriver {
        config.browser.webdriver_url = webdriver;
    }
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(warmup) = cli.warmup {
        config.timeouts.warmup_count = warmup;
    }

    let cmd = PricesCommand::new(config);
    let report = cmd.execute(&TracingReporter).await?;

    if !report.rows.is_empty() {
        println!("{}", summary_table(&report.rows));
    }

    Ok(())
}
