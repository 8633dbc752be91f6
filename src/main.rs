//! shop-extract - Marketplace product page extractor CLI
//!
//! Extracts canonical product records from marketplace product pages,
//! saved or fetched live with TLS fingerprint emulation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shop_extract::client::{PageClient, PageFetch};
use shop_extract::commands::{ExtractArgs, ExtractCommand, GrabCommand};
use shop_extract::config::{Config, OutputFormat};
use shop_extract::Platform;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shop-extract",
    version,
    about = "Marketplace product page extractor",
    long_about = "Extracts canonical product/variant/review records from eBay, Amazon, \
                  AliExpress, Temu, Shein and Walmart product pages."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "SHOPX_PROXY")]
    proxy: Option<String>,

    /// Delay before fetches in milliseconds
    #[arg(long, default_value = "2000", global = true, env = "SHOPX_DELAY")]
    delay: u64,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a saved product page (HTML file or stdin)
    #[command(alias = "x")]
    Extract {
        /// HTML file to parse ("-" for stdin)
        input: PathBuf,

        /// Original page URL (drives platform detection and item ids)
        #[arg(short, long)]
        url: Option<String>,

        /// Force a platform instead of detecting from the URL
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Captured network response files (JSON {url, body})
        #[arg(long = "capture")]
        captures: Vec<PathBuf>,

        /// Append a completeness report
        #[arg(long)]
        report: bool,
    },

    /// Fetch a product page and save the raw HTML
    Fetch {
        /// Product page URL
        url: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch and extract a product page in one step
    #[command(alias = "g")]
    Grab {
        /// Product page URL
        url: String,

        /// Force a platform instead of detecting from the URL
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Append a completeness report
        #[arg(long)]
        report: bool,
    },

    /// List supported platforms
    Platforms,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;
    config.delay_ms = cli.delay;

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Extract { input, url, platform, captures, report } => {
            let cmd = ExtractCommand::new(config);
            let args = ExtractArgs { input: Some(input), url, platform, captures, report };
            let output = cmd.execute(&args)?;
            println!("{}", output);
        }

        Commands::Fetch { url, output } => {
            let client = PageClient::new(&config).context("Failed to create HTTP client")?;
            let html = client.page(&url).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &html)
                        .with_context(|| format!("Failed to write: {}", path.display()))?;
                    eprintln!("Saved {} bytes to {}", html.len(), path.display());
                }
                None => println!("{}", html),
            }
        }

        Commands::Grab { url, platform, report } => {
            let cmd = GrabCommand::new(config);
            let output = cmd.execute(&url, platform, report).await?;
            println!("{}", output);
        }

        Commands::Platforms => {
            println!("Supported platforms:\n");
            println!("{:<12} {:<30}", "Name", "Example product URL");
            println!("{:-<12} {:-<30}", "", "");

            for (platform, example) in [
                (Platform::AliExpress, "aliexpress.com/item/<id>.html"),
                (Platform::Amazon, "amazon.com/dp/<ASIN>"),
                (Platform::Ebay, "ebay.com/itm/<id>"),
                (Platform::Temu, "temu.com/goods.html?goods_id=<id>"),
                (Platform::Shein, "shein.com/...-p-<id>.html"),
                (Platform::Walmart, "walmart.com/ip/.../<id>"),
                (Platform::Generic, "any shop with JSON-LD or OpenGraph"),
            ] {
                println!("{:<12} {:<30}", platform.to_string(), example);
            }
        }
    }

    Ok(())
}
