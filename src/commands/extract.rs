//! Offline extraction command: saved HTML in, canonical record out.

use crate::config::Config;
use crate::extract::{extract_with_limits, PageContext, Platform};
use crate::format::Formatter;
use crate::observe::NetworkCapture;
use crate::report::CompletenessReport;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs of one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractArgs {
    /// HTML file path; "-" or None reads stdin.
    pub input: Option<PathBuf>,
    /// Original page URL, used for platform detection and item ids.
    pub url: Option<String>,
    /// Platform override; skips URL detection.
    pub platform: Option<Platform>,
    /// Captured network response files (JSON `{url, body}` entries).
    pub captures: Vec<PathBuf>,
    /// Append the completeness report to the output.
    pub report: bool,
}

/// Executes extraction over a saved page.
pub struct ExtractCommand {
    config: Config,
}

impl ExtractCommand {
    /// Creates a new extract command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the extraction and returns formatted output.
    pub fn execute(&self, args: &ExtractArgs) -> Result<String> {
        let html = read_input(args.input.as_deref())?;

        let mut capture = NetworkCapture::new();
        for path in &args.captures {
            let count = capture.load_file(path)?;
            info!("Loaded {} captured responses from {}", count, path.display());
        }

        let url = args.url.clone().unwrap_or_default();
        let mut ctx = PageContext::new(&html, url).with_capture(capture);
        if let Some(platform) = args.platform {
            ctx = ctx.with_platform(platform);
        }

        info!("Extracting as {}", ctx.platform());
        let record = extract_with_limits(&ctx, &self.config.limits());

        let formatter = Formatter::new(self.config.format);
        if args.report {
            let report = CompletenessReport::evaluate(&record);
            Ok(formatter.format_with_report(&record, &report))
        } else {
            Ok(formatter.format_record(&record))
        }
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        _ => {
            let mut html = String::new();
            std::io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read HTML from stdin")?;
            Ok(html)
        }
    }
}
