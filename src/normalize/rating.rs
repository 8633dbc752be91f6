//! Star-rating and review-count parsing across locale formats.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// "4.5/5", "4,5 / 5"
static SLASH_FIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*/\s*5").unwrap());

/// "4.5 out of 5", "4,5 sur 5", "4,5 von 5", "4,5 de 5"
static WORDED_FIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:out of|sur|von|de)\s*5").unwrap());

/// Star-width percentage, e.g. "width: 80%".
static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,3})\s*%").unwrap());

/// "12k", "1.2k+", "3 k"
static KILO_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*[kK]\+?").unwrap());

/// "(1 234)", "(12,345)"
static PAREN_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([\d\s.,]+)\)").unwrap());

/// Aggregate rating extracted from a page fragment pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f32,
    pub total_count: u32,
}

impl RatingSummary {
    /// Builds a summary from raw rating and count fragments, applying
    /// the documented defaults (5.0 / 0) when a fragment is unparseable.
    pub fn from_fragments(rating_text: &str, count_text: &str) -> Self {
        Self {
            average_rating: parse_rating(rating_text).unwrap_or(5.0),
            total_count: parse_review_count(count_text),
        }
    }
}

/// Extracts a star rating in [0, 5] from free text.
///
/// Patterns are tried in order; the first match wins. Returns None when
/// nothing matches - the default of 5 belongs to the record boundary,
/// not to this parser.
pub fn parse_rating(text: &str) -> Option<f32> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some(caps) = SLASH_FIVE.captures(text).or_else(|| WORDED_FIVE.captures(text)) {
        let value: f32 = caps[1].replace(',', ".").parse().ok()?;
        return Some(value.clamp(0.0, 5.0));
    }

    // Glyph counting: each filled star is one point, "½" adds a half.
    let full = text.chars().filter(|c| *c == '★' || *c == '⭐').count();
    if full > 0 {
        let half = if text.contains('½') { 0.5 } else { 0.0 };
        return Some((full as f32 + half).clamp(0.0, 5.0));
    }

    // Star-bar widths express the rating as a percentage of five stars.
    if let Some(caps) = PERCENT.captures(text) {
        let pct: f32 = caps[1].parse().ok()?;
        return Some((pct / 20.0).clamp(0.0, 5.0));
    }

    None
}

/// Extracts a review count from localized numeric text.
///
/// Handles thousand separators ("1,234", "1 234"), the parenthetical
/// form "(N)", and the "12k+" shorthand. Unmatched input yields 0.
pub fn parse_review_count(text: &str) -> u32 {
    if let Some(caps) = KILO_COUNT.captures(text) {
        if let Ok(base) = caps[1].replace(',', ".").parse::<f64>() {
            return (base * 1000.0).round() as u32;
        }
    }

    let digits_of = |s: &str| -> u32 {
        let cleaned: String = s.chars().filter(char::is_ascii_digit).collect();
        cleaned.parse().unwrap_or(0)
    };

    if let Some(caps) = PAREN_COUNT.captures(text) {
        let count = digits_of(&caps[1]);
        if count > 0 {
            return count;
        }
    }

    digits_of(text)
}
