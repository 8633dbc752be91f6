//! Supported marketplaces: detection from URLs and item-id extraction.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Marketplaces with a dedicated extractor. `Generic` covers any other
/// shop via JSON-LD/OpenGraph/DOM heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    AliExpress,
    Amazon,
    Ebay,
    Temu,
    Shein,
    Walmart,
    #[default]
    Generic,
}

static ALIEXPRESS_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    patterns(&[
        r"/item/(\d+)\.html",
        r"/i/(\d+)\.html",
        r"/_p/(\d+)",
        r"productId=(\d+)",
        r"/(\d{10,})\.html",
    ])
});

static AMAZON_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"/dp/([A-Z0-9]{10})", r"/gp/product/([A-Z0-9]{10})"]));

static EBAY_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"/itm/(\d+)", r"/itm/[^/]+/(\d+)"]));

static TEMU_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"goods_id=(\d+)", r"-g-(\d+)\.html"]));

static SHEIN_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| patterns(&[r"-p-(\d+)"]));

static WALMART_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| patterns(&[r"/ip/[^/]+/(\d+)", r"/ip/(\d+)"]));

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|src| Regex::new(src).unwrap()).collect()
}

impl Platform {
    /// Detects the platform from a product page URL.
    pub fn detect(url: &str) -> Platform {
        let host = host_of(url);
        if host.contains("aliexpress.") {
            Platform::AliExpress
        } else if host.contains("amazon.") {
            Platform::Amazon
        } else if host.contains("ebay.") {
            Platform::Ebay
        } else if host.contains("temu.") {
            Platform::Temu
        } else if host.contains("shein.") {
            Platform::Shein
        } else if host.contains("walmart.") {
            Platform::Walmart
        } else {
            Platform::Generic
        }
    }

    /// Extracts the platform-specific item identifier from the URL.
    pub fn extract_external_id(&self, url: &str) -> Option<String> {
        let id_patterns: &[Regex] = match self {
            Platform::AliExpress => &ALIEXPRESS_IDS,
            Platform::Amazon => &AMAZON_IDS,
            Platform::Ebay => &EBAY_IDS,
            Platform::Temu => &TEMU_IDS,
            Platform::Shein => &SHEIN_IDS,
            Platform::Walmart => &WALMART_IDS,
            Platform::Generic => return None,
        };

        id_patterns.iter().find_map(|re| re.captures(url).map(|c| c[1].to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AliExpress => "aliexpress",
            Platform::Amazon => "amazon",
            Platform::Ebay => "ebay",
            Platform::Temu => "temu",
            Platform::Shein => "shein",
            Platform::Walmart => "walmart",
            Platform::Generic => "generic",
        }
    }

    /// All platforms with dedicated extractors, plus the fallback.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::AliExpress,
            Platform::Amazon,
            Platform::Ebay,
            Platform::Temu,
            Platform::Shein,
            Platform::Walmart,
            Platform::Generic,
        ]
    }
}

/// Host part of a URL, without scheme, credentials or path.
fn host_of(url: &str) -> String {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    host.rsplit('@').next().unwrap_or(host).to_lowercase()
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aliexpress" | "ali" => Ok(Platform::AliExpress),
            "amazon" => Ok(Platform::Amazon),
            "ebay" => Ok(Platform::Ebay),
            "temu" => Ok(Platform::Temu),
            "shein" => Ok(Platform::Shein),
            "walmart" => Ok(Platform::Walmart),
            "generic" | "auto" => Ok(Platform::Generic),
            _ => Err(format!(
                "Unknown platform: {}. Use: aliexpress, amazon, ebay, temu, shein, walmart, generic",
                s
            )),
        }
    }
}
