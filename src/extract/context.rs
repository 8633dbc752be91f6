//! Parsed page handed to extractors, with shared lookup helpers.

use crate::extract::Platform;
use crate::normalize::text::clean_text;
use crate::observe::NetworkCapture;
use regex_lite::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

static LD_JSON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type='application/ld+json']").unwrap());

static INLINE_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script:not([src])").unwrap());

/// Everything an extractor may read for one page: the parsed document,
/// the page URL, the detected platform and any captured network
/// responses. Extractor methods read from here and write only their own
/// results - no shared mutable state.
pub struct PageContext {
    document: Html,
    url: String,
    platform: Platform,
    capture: NetworkCapture,
}

impl PageContext {
    /// Parses a page, detecting the platform from the URL.
    pub fn new(html: &str, url: impl Into<String>) -> Self {
        let url = url.into();
        let platform = Platform::detect(&url);
        Self { document: Html::parse_document(html), url, platform, capture: NetworkCapture::new() }
    }

    /// Overrides the detected platform (CLI `--platform`).
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Attaches captured network responses.
    pub fn with_capture(mut self, capture: NetworkCapture) -> Self {
        self.capture = capture;
        self
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn capture(&self) -> &NetworkCapture {
        &self.capture
    }

    /// First non-empty text under the first selector that matches.
    /// Selector order is priority order, not document order.
    pub fn first_text(&self, selector_chain: &[Selector]) -> Option<String> {
        for selector in selector_chain {
            for element in self.document.select(selector) {
                let text = clean_text(&element.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    /// First non-empty value among `attrs` on elements matching the
    /// chain, in priority order.
    pub fn first_attr(&self, selector_chain: &[Selector], attrs: &[&str]) -> Option<String> {
        for selector in selector_chain {
            for element in self.document.select(selector) {
                for attr in attrs {
                    if let Some(value) = element.value().attr(attr) {
                        let value = value.trim();
                        if !value.is_empty() {
                            return Some(value.to_string());
                        }
                    }
                }
            }
        }
        None
    }

    /// All attribute values across the chain, in chain-then-document
    /// order, duplicates included (deduplication happens downstream).
    pub fn all_attrs(&self, selector_chain: &[Selector], attrs: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for selector in selector_chain {
            for element in self.document.select(selector) {
                if let Some(value) =
                    attrs.iter().find_map(|attr| element.value().attr(attr)).map(str::trim)
                {
                    if !value.is_empty() {
                        out.push(value.to_string());
                    }
                }
            }
        }
        out
    }

    /// Content of `<meta property=..>` or `<meta name=..>`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let selector =
            Selector::parse(&format!("meta[property='{key}'], meta[name='{key}']")).ok()?;
        self.document
            .select(&selector)
            .find_map(|e| e.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// All JSON-LD `Product` nodes on the page, flattening arrays and
    /// `@graph` containers. Malformed blocks are skipped.
    pub fn json_ld_products(&self) -> Vec<Value> {
        let mut products = Vec::new();
        for script in self.document.select(&LD_JSON) {
            let text = script.text().collect::<String>();
            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                collect_ld_products(&value, &mut products);
            }
        }
        products
    }

    /// Texts of all inline (non-src) script tags.
    pub fn inline_scripts(&self) -> Vec<String> {
        self.document.select(&INLINE_SCRIPT).map(|s| s.text().collect::<String>()).collect()
    }

    /// Finds a JSON object embedded in inline script text after a
    /// marker, e.g. `window.runParams = {...}`. The first script where
    /// the balanced object parses wins.
    pub fn script_json_after(&self, marker: &str) -> Option<Value> {
        for script in self.inline_scripts() {
            if let Some(raw) = find_json_object(&script, marker) {
                if let Ok(value) = serde_json::from_str(raw) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// First capture group of `re` across inline scripts, parsed as JSON.
    pub fn script_json_capture(&self, re: &Regex) -> Option<Value> {
        for script in self.inline_scripts() {
            if let Some(caps) = re.captures(&script) {
                if let Ok(value) = serde_json::from_str(&caps[1]) {
                    return Some(value);
                }
            }
        }
        None
    }
}

fn collect_ld_products(value: &Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_ld_products(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect_ld_products(graph, out);
            }
            let is_product = match map.get("@type") {
                Some(Value::String(t)) => t == "Product",
                Some(Value::Array(types)) => types.iter().any(|t| t == "Product"),
                _ => false,
            };
            if is_product {
                out.push(value.clone());
            }
        }
        _ => {}
    }
}

/// Extracts the balanced `{...}` object that follows `marker` in raw
/// script text, respecting string literals and escapes. Returns the raw
/// JSON slice without validating it.
pub fn find_json_object<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let open = rest.find('{')?;
    let bytes = rest.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[open..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
