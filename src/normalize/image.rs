//! Image URL normalization and order-preserving deduplication.
//!
//! CDN thumbnails are rewritten to the highest resolution the platform
//! serves, query strings are dropped, and duplicates are collapsed by a
//! key derived from the normalized filename. Malformed entries are
//! silently discarded - this module never fails.

use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// eBay CDN size token: s-l64, s-l300, ... -> s-l1600.
static EBAY_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"s-l\d+").unwrap());

/// AliExpress `_640x640.jpg` / `_640x640q90.jpg` style suffix.
static ALI_SIZE_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+x\d+\w*\.").unwrap());

/// AliExpress `.640x640.` infix variant.
static ALI_SIZE_DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\d+x\d+\.").unwrap());

/// AliExpress double-extension thumbnail: `.jpg_640x640.jpg`.
static ALI_DOUBLE_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.jpg_\d+x\d+\.jpg").unwrap());

/// Amazon size token between underscores: `._AC_SL300_.` -> `.`.
static AMAZON_SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\._[^.]*_\.").unwrap());

/// Normalizes one raw image URL or attribute value.
///
/// Returns None for empty or non-HTTP(S) input. Protocol-relative URLs
/// are assumed HTTPS.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = raw.trim().to_string();
    if url.is_empty() {
        return None;
    }

    if url.starts_with("//") {
        url = format!("https:{url}");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return None;
    }

    url = upgrade_resolution(&url);

    // Query parameters carry cache busters and tracking, never identity.
    if let Some(idx) = url.find('?') {
        url.truncate(idx);
    }

    Some(url)
}

/// Rewrites known CDN size tokens to request the largest rendition.
fn upgrade_resolution(url: &str) -> String {
    if url.contains("ebayimg.com") {
        return EBAY_SIZE.replace_all(url, "s-l1600").into_owned();
    }

    if url.contains("alicdn.com") {
        let url = ALI_DOUBLE_EXT.replace_all(url, ".jpg");
        let url = ALI_SIZE_UNDERSCORE.replace_all(&url, "_800x800.");
        return ALI_SIZE_DOT.replace_all(&url, ".800x800.").into_owned();
    }

    if url.contains("media-amazon.com") || url.contains("images-amazon.com") {
        return AMAZON_SIZE.replace_all(url, ".").into_owned();
    }

    url.to_string()
}

/// Key under which duplicates collapse: scheme dropped, extension
/// stripped, lowercased. Same file at two sizes maps to one key once
/// size tokens have been normalized away. The full path stays in the
/// key - eBay names every gallery file s-l1600.jpg and keeps the
/// identity in the directory.
fn dedup_key(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let path = path.strip_prefix("https://").or_else(|| path.strip_prefix("http://")).unwrap_or(path);
    let stem = match path.rsplit_once('.') {
        // Only treat the trailing dot as an extension separator when it
        // sits inside the last path segment.
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    };
    stem.to_lowercase()
}

/// Normalizes and deduplicates a sequence of raw image URLs.
///
/// First occurrence wins; relative order of survivors is preserved.
/// Output is capped at `cap` entries.
pub fn normalize_all<I>(raw: I, cap: usize) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for entry in raw {
        if out.len() >= cap {
            break;
        }
        let Some(url) = normalize_url(entry.as_ref()) else {
            continue;
        };
        if seen.insert(dedup_key(&url)) {
            out.push(url);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_relative() {
        assert_eq!(
            normalize_url("//ae01.alicdn.com/kf/abc.jpg"),
            Some("https://ae01.alicdn.com/kf/abc.jpg".to_string())
        );
    }

    #[test]
    fn test_rejects_non_http() {
        assert_eq!(normalize_url(""), None);
        assert_eq!(normalize_url("   "), None);
        assert_eq!(normalize_url("data:image/png;base64,AAAA"), None);
        assert_eq!(normalize_url("ftp://example.com/a.jpg"), None);
    }

    #[test]
    fn test_ebay_resolution_upgrade() {
        assert_eq!(
            normalize_url("https://i.ebayimg.com/images/g/abc/s-l300.jpg"),
            Some("https://i.ebayimg.com/images/g/abc/s-l1600.jpg".to_string())
        );
    }

    #[test]
    fn test_aliexpress_resolution_upgrade() {
        assert_eq!(
            normalize_url("https://ae01.alicdn.com/kf/abc_640x640.jpg"),
            Some("https://ae01.alicdn.com/kf/abc_800x800.jpg".to_string())
        );
        assert_eq!(
            normalize_url("https://ae01.alicdn.com/kf/abc.jpg_350x350.jpg"),
            Some("https://ae01.alicdn.com/kf/abc.jpg".to_string())
        );
    }

    #[test]
    fn test_amazon_size_token_stripped() {
        assert_eq!(
            normalize_url("https://m.media-amazon.com/images/I/71abc._AC_SL300_.jpg"),
            Some("https://m.media-amazon.com/images/I/71abc.jpg".to_string())
        );
    }

    #[test]
    fn test_query_string_stripped() {
        assert_eq!(
            normalize_url("https://cdn.example.com/img/photo.jpg?v=2&w=600"),
            Some("https://cdn.example.com/img/photo.jpg".to_string())
        );
    }

    #[test]
    fn test_dedup_same_filename_different_query() {
        let urls =
            ["https://cdn.example.com/a.jpg".to_string(), "https://cdn.example.com/a.jpg?v=2".to_string()];
        assert_eq!(normalize_all(urls, 30).len(), 1);
    }

    #[test]
    fn test_dedup_same_image_different_size() {
        let urls = [
            "https://i.ebayimg.com/images/g/abc/s-l300.jpg",
            "https://i.ebayimg.com/images/g/abc/s-l1600.jpg",
        ];
        let out = normalize_all(urls, 30);
        assert_eq!(out, vec!["https://i.ebayimg.com/images/g/abc/s-l1600.jpg".to_string()]);
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let urls = [
            "https://cdn.example.com/b.jpg",
            "https://cdn.example.com/a.jpg",
            "https://cdn.example.com/b.jpg",
            "https://cdn.example.com/c.jpg",
        ];
        let out = normalize_all(urls, 30);
        assert_eq!(
            out,
            vec![
                "https://cdn.example.com/b.jpg".to_string(),
                "https://cdn.example.com/a.jpg".to_string(),
                "https://cdn.example.com/c.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedup_idempotent() {
        let urls = [
            "https://cdn.example.com/a.jpg",
            "https://cdn.example.com/b.jpg?x=1",
            "//cdn.example.com/c.jpg",
        ];
        let once = normalize_all(urls, 30);
        let twice = normalize_all(once.clone(), 30);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cap_applied() {
        let urls: Vec<String> =
            (0..50).map(|i| format!("https://cdn.example.com/img{i}.jpg")).collect();
        assert_eq!(normalize_all(urls, 30).len(), 30);
    }

    #[test]
    fn test_malformed_entries_dropped_silently() {
        let urls = ["https://cdn.example.com/a.jpg", "not a url", "", "javascript:void(0)"];
        assert_eq!(normalize_all(urls, 30).len(), 1);
    }
}
