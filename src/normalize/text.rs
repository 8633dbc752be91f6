//! Free-text cleanup: tag stripping, whitespace collapse, length caps.

/// Character cap applied to review bodies.
pub const REVIEW_CONTENT_CAP: usize = 1000;
/// Character cap applied to product descriptions.
pub const DESCRIPTION_CAP: usize = 5000;

/// Trims and collapses runs of whitespace into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes markup tags, keeping their inner text, and decodes the
/// handful of entities that show up in scraped fragments.
pub fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => {
                in_tag = true;
                // Keep a word boundary where the tag was.
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Truncates to at most `cap` characters on a char boundary.
pub fn cap_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Full review-body sanitization: strip tags, collapse whitespace, cap.
pub fn sanitize_review_content(text: &str) -> String {
    cap_chars(&clean_text(&strip_html(text)), REVIEW_CONTENT_CAP)
}

/// Description sanitization with the larger cap.
pub fn sanitize_description(text: &str) -> String {
    cap_chars(&clean_text(&strip_html(text)), DESCRIPTION_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hello   world \n\t again "), "hello world again");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(clean_text(&strip_html("<b>Bold</b> and <i>italic</i>")), "Bold and italic");
        assert_eq!(clean_text(&strip_html("plain text")), "plain text");
    }

    #[test]
    fn test_strip_html_entities() {
        assert_eq!(strip_html("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(strip_html("a&nbsp;b"), "a b");
        assert_eq!(strip_html("&quot;quoted&quot;"), "\"quoted\"");
    }

    #[test]
    fn test_strip_html_unclosed_tag() {
        // A dangling tag swallows the rest instead of leaking markup.
        assert_eq!(clean_text(&strip_html("text <img src='x")), "text");
    }

    #[test]
    fn test_cap_chars() {
        assert_eq!(cap_chars("hello", 10), "hello");
        assert_eq!(cap_chars("hello", 3), "hel");
        // Multibyte chars are counted as one.
        assert_eq!(cap_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_sanitize_review_content_caps() {
        let long = "x".repeat(2000);
        assert_eq!(sanitize_review_content(&long).chars().count(), REVIEW_CONTENT_CAP);
    }

    #[test]
    fn test_sanitize_review_content_strips_and_collapses() {
        let content = "<p>Great   fit!</p>\n<p>Would buy again.</p>";
        assert_eq!(sanitize_review_content(content), "Great fit! Would buy again.");
    }
}
