//! Fetch-and-extract command: product URL in, formatted record out.

use crate::client::{PageClient, PageFetch};
use crate::config::Config;
use crate::extract::{extract_with_limits, PageContext, Platform};
use crate::format::Formatter;
use crate::report::CompletenessReport;
use anyhow::{Context, Result};
use tracing::info;

/// Fetches a live product page and extracts it in one step.
pub struct GrabCommand {
    config: Config,
}

impl GrabCommand {
    /// Creates a new grab command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches and extracts, returning formatted output.
    pub async fn execute(
        &self,
        url: &str,
        platform: Option<Platform>,
        report: bool,
    ) -> Result<String> {
        let client = PageClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, url, platform, report).await
    }

    /// Fetches with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl PageFetch,
        url: &str,
        platform: Option<Platform>,
        report: bool,
    ) -> Result<String> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Invalid URL: '{}'. Expected an http(s) product page URL.", url);
        }

        info!("Fetching product page: {}", url);
        let html = client.page(url).await?;

        let mut ctx = PageContext::new(&html, url);
        if let Some(platform) = platform {
            ctx = ctx.with_platform(platform);
        }

        info!("Extracting as {}", ctx.platform());
        let record = extract_with_limits(&ctx, &self.config.limits());

        let formatter = Formatter::new(self.config.format);
        if report {
            let report = CompletenessReport::evaluate(&record);
            Ok(formatter.format_with_report(&record, &report))
        } else {
            Ok(formatter.format_record(&record))
        }
    }
}
