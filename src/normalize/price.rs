//! Locale-aware price string parsing and discount calculation.

use crate::model::Money;
use regex_lite::Regex;
use std::sync::LazyLock;

/// European grouped-decimal form: "1 234,56" or "1.234,56".
static EURO_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}([.\s]\d{3})*,\d{2}$").unwrap());

/// Currency symbol to ISO code. First match in the raw string wins;
/// EUR is the fallback when nothing identifies the currency.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("€", "EUR"),
    ("$", "USD"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("EUR", "EUR"),
    ("USD", "USD"),
    ("GBP", "GBP"),
    ("JPY", "JPY"),
];

/// Parses a raw price fragment into a normalized monetary value.
///
/// Parse failures and empty input yield a zero amount - the extraction
/// contract never surfaces an error for a bad price string.
pub fn parse_price(raw: &str) -> Money {
    let currency = detect_currency(raw).unwrap_or("EUR");
    let amount = parse_amount(raw).unwrap_or(0.0);
    Money::new(amount, currency)
}

/// Returns the ISO code for the first recognized symbol or code in `raw`.
pub fn detect_currency(raw: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS.iter().find(|(sym, _)| raw.contains(sym)).map(|(_, code)| *code)
}

/// Parses the numeric part of a price string, handling both US
/// ("1,234.56") and European ("1.234,56", "1 234,56") formats.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == ' ')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if EURO_GROUPED.is_match(cleaned) {
        // Grouped European: strip group separators, decimal comma -> point.
        cleaned.replace(['.', ' '], "").replace(',', ".")
    } else {
        let compact = cleaned.replace(' ', "");
        match (compact.rfind(','), compact.rfind('.')) {
            // Lone comma: decimal separator when at most two digits
            // follow ("29,99"), thousands grouping otherwise ("2,999").
            (Some(idx), None) => {
                let decimals = compact.len() - idx - 1;
                if decimals <= 2 && compact.matches(',').count() == 1 {
                    compact.replace(',', ".")
                } else {
                    compact.replace(',', "")
                }
            }
            (None, _) => compact,
            // Both present: the later separator is the decimal one.
            (Some(c), Some(p)) => {
                if c > p {
                    compact.replace('.', "").replace(',', ".")
                } else {
                    compact.replace(',', "")
                }
            }
        }
    };

    normalized.parse().ok().filter(|v: &f64| v.is_finite())
}

/// Discount percentage from original to sale price.
///
/// Zero when either value is non-positive or there is no discount;
/// capped at 99 so a pathological pair never reads as "free".
pub fn calculate_discount(original: f64, sale: f64) -> u8 {
    if original <= 0.0 || sale <= 0.0 || sale >= original {
        return 0;
    }
    let pct = ((original - sale) / original * 100.0).round() as u8;
    pct.min(99)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_us() {
        assert_eq!(parse_amount("$29.99"), Some(29.99));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("29.99"), Some(29.99));
        assert_eq!(parse_amount("$10"), Some(10.0));
    }

    #[test]
    fn test_parse_amount_european() {
        assert_eq!(parse_amount("29,99 €"), Some(29.99));
        assert_eq!(parse_amount("1.234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("1 234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("€0,99"), Some(0.99));
    }

    #[test]
    fn test_parse_amount_lone_comma_is_decimal() {
        assert_eq!(parse_amount("19,5"), Some(19.5));
        assert_eq!(parse_amount("1234,56"), Some(1234.56));
    }

    #[test]
    fn test_parse_amount_lone_comma_as_grouping() {
        // Three digits after a single comma read as thousands.
        assert_eq!(parse_amount("2,999"), Some(2999.0));
        assert_eq!(parse_amount("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn test_parse_amount_empty_and_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("call for price"), None);
    }

    #[test]
    fn test_parse_price_currency_detection() {
        assert_eq!(parse_price("1 234,56 €"), Money::new(1234.56, "EUR"));
        assert_eq!(parse_price("$1,234.56"), Money::new(1234.56, "USD"));
        assert_eq!(parse_price("£39.99"), Money::new(39.99, "GBP"));
        assert_eq!(parse_price("¥2,999"), Money::new(2999.0, "JPY"));
        assert_eq!(parse_price("USD 15.00"), Money::new(15.0, "USD"));
    }

    #[test]
    fn test_parse_price_defaults_to_eur() {
        let money = parse_price("12.50");
        assert_eq!(money.currency, "EUR");
        assert_eq!(money.amount, 12.5);
    }

    #[test]
    fn test_parse_price_failure_is_zero() {
        let money = parse_price("sold out");
        assert!(money.is_zero());

        let money = parse_price("");
        assert!(money.is_zero());
    }

    #[test]
    fn test_calculate_discount() {
        assert_eq!(calculate_discount(49.99, 29.99), 40);
        assert_eq!(calculate_discount(100.0, 75.0), 25);
        assert_eq!(calculate_discount(40.0, 20.0), 50);
    }

    #[test]
    fn test_calculate_discount_guards() {
        assert_eq!(calculate_discount(0.0, 29.99), 0);
        assert_eq!(calculate_discount(29.99, 0.0), 0);
        assert_eq!(calculate_discount(-10.0, 5.0), 0);
        // No discount when sale >= original.
        assert_eq!(calculate_discount(20.0, 20.0), 0);
        assert_eq!(calculate_discount(20.0, 25.0), 0);
    }

    #[test]
    fn test_calculate_discount_cap() {
        assert_eq!(calculate_discount(1000.0, 1.0), 99);
    }
}
