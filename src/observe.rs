//! Captured network responses, injected into extraction.
//!
//! Marketplace SPAs load reviews and SKU tables over XHR after the
//! initial document. Rather than patching a global fetch, captured
//! response bodies are handed to the extractor explicitly (on the CLI
//! via `--capture`); the store classifies them by URL and the extractor
//! reads them once at extraction time. Responses arriving after that
//! point are simply missed - there is no retry or wait semantics.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// URL substrings that mark a response worth keeping.
const RELEVANT_MARKERS: &[&str] = &["/api/", "item", "product", "sku", "review", "feedback"];

/// One captured response: the request URL plus the parsed JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    pub url: String,
    pub body: Value,
}

/// Classified store of captured responses for one page session.
#[derive(Debug, Clone, Default)]
pub struct NetworkCapture {
    product: Vec<Value>,
    skus: Vec<Value>,
    reviews: Vec<Value>,
}

impl NetworkCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request URL looks like product/SKU/review traffic.
    pub fn is_relevant(url: &str) -> bool {
        RELEVANT_MARKERS.iter().any(|marker| url.contains(marker))
    }

    /// Records one response body, classified by its URL. Irrelevant
    /// URLs are dropped.
    pub fn record(&mut self, url: &str, body: Value) {
        if !Self::is_relevant(url) {
            return;
        }
        if url.contains("review") || url.contains("feedback") {
            self.reviews.push(body);
        } else if url.contains("sku") {
            self.skus.push(body);
        } else {
            self.product.push(body);
        }
    }

    /// Loads observations from a JSON file holding either one
    /// `{url, body}` object or an array of them.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse capture file: {}", path.display()))?;

        let observations: Vec<Observation> = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            _ => vec![serde_json::from_value(value)?],
        };

        let count = observations.len();
        for obs in observations {
            self.record(&obs.url, obs.body);
        }
        Ok(count)
    }

    pub fn product(&self) -> &[Value] {
        &self.product
    }

    pub fn skus(&self) -> &[Value] {
        &self.skus
    }

    pub fn reviews(&self) -> &[Value] {
        &self.reviews
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty() && self.skus.is_empty() && self.reviews.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_is_relevant() {
        assert!(NetworkCapture::is_relevant("https://www.ebay.com/api/listing/123"));
        assert!(NetworkCapture::is_relevant("https://x.com/itm/item?id=1"));
        assert!(NetworkCapture::is_relevant("https://x.com/fetch/reviews?page=2"));
        assert!(!NetworkCapture::is_relevant("https://x.com/analytics/beacon"));
    }

    #[test]
    fn test_record_classification() {
        let mut capture = NetworkCapture::new();
        capture.record("https://x.com/api/reviews?p=1", json!({"a": 1}));
        capture.record("https://x.com/api/feedback/list", json!({"b": 2}));
        capture.record("https://x.com/api/sku/prices", json!({"c": 3}));
        capture.record("https://x.com/api/item/123", json!({"d": 4}));
        capture.record("https://x.com/tracking/pixel", json!({"e": 5}));

        assert_eq!(capture.reviews().len(), 2);
        assert_eq!(capture.skus().len(), 1);
        assert_eq!(capture.product().len(), 1);
    }

    #[test]
    fn test_empty() {
        let capture = NetworkCapture::new();
        assert!(capture.is_empty());
    }

    #[test]
    fn test_load_file_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"url": "https://x.com/api/reviews", "body": {{"count": 2}}}},
                {{"url": "https://x.com/api/item/9", "body": {{}}}}]"#
        )
        .unwrap();

        let mut capture = NetworkCapture::new();
        let count = capture.load_file(file.path()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(capture.reviews().len(), 1);
        assert_eq!(capture.product().len(), 1);
    }

    #[test]
    fn test_load_file_single_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"url": "https://x.com/api/sku/1", "body": {{"stock": 4}}}}"#).unwrap();

        let mut capture = NetworkCapture::new();
        assert_eq!(capture.load_file(file.path()).unwrap(), 1);
        assert_eq!(capture.skus().len(), 1);
    }

    #[test]
    fn test_load_file_missing() {
        let mut capture = NetworkCapture::new();
        let result = capture.load_file(Path::new("/nonexistent/capture.json"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }
}
