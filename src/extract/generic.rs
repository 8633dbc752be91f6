//! Fallback extraction strategies: JSON-LD, OpenGraph meta, plain DOM.
//!
//! These double as the default trait methods for every platform
//! adapter. Strategy order is fixed: structured data first, meta tags
//! second, DOM heuristics last - the most specific accurate source
//! wins.

use crate::extract::selectors::generic as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, ReviewRecord, VideoRecord};
use crate::normalize::price::{parse_amount, parse_price};
use crate::normalize::text::{clean_text, sanitize_description};
use regex_lite::Regex;
use scraper::Selector;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(?:videoUrl|video_url)["']?\s*:\s*["']([^"']+\.mp4[^"']*)["']"#).unwrap()
});

static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th, td").unwrap());

/// Fallback adapter for shops without a dedicated extractor.
pub struct GenericExtractor;

impl Extractor for GenericExtractor {
    fn platform(&self) -> Platform {
        Platform::Generic
    }
}

/// First string value among `keys` on a JSON object.
pub(crate) fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(clean_text(s)),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First numeric value among `keys`, accepting numeric strings.
pub(crate) fn f64_field(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| value_to_f64(value.get(key)?))
}

/// Lenient number coercion: JSON number, or a string price fragment.
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

pub(crate) fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as u32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Brand on a JSON-LD product: plain string or `{ name: ... }`.
fn ld_brand(product: &Value) -> Option<String> {
    match product.get("brand") {
        Some(Value::String(s)) => Some(clean_text(s)),
        Some(obj @ Value::Object(_)) => str_field(obj, &["name"]),
        _ => None,
    }
}

/// Price and currency from JSON-LD offers (object or array form).
fn ld_offer(product: &Value) -> Option<(f64, Option<String>)> {
    let offers = product.get("offers")?;
    let offer = match offers {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let price = f64_field(offer, &["price", "lowPrice"])?;
    let currency = str_field(offer, &["priceCurrency"]);
    Some((price, currency))
}

/// Image URLs on a JSON-LD product: string, array, or `{ url: ... }`.
fn ld_images(product: &Value) -> Vec<String> {
    match product.get("image") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                obj @ Value::Object(_) => str_field(obj, &["url"]),
                _ => None,
            })
            .collect(),
        Some(obj @ Value::Object(_)) => str_field(obj, &["url"]).into_iter().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn basic_info(ctx: &PageContext) -> BasicInfo {
    let mut info = BasicInfo::default();

    for product in ctx.json_ld_products() {
        if info.title.is_empty() {
            if let Some(name) = str_field(&product, &["name"]) {
                info.title = name;
            }
        }
        if info.description.is_empty() {
            if let Some(description) = str_field(&product, &["description"]) {
                info.description = sanitize_description(&description);
            }
        }
        if info.brand.is_empty() {
            if let Some(brand) = ld_brand(&product) {
                info.brand = brand;
            }
        }
        if info.sku.is_empty() {
            if let Some(sku) = str_field(&product, &["sku", "productID", "mpn"]) {
                info.sku = sku;
            }
        }
    }

    if info.title.is_empty() {
        if let Some(title) = ctx.meta_content("og:title") {
            info.title = clean_text(&title);
        }
    }
    if info.title.is_empty() {
        info.title = ctx.first_text(&sel::TITLE).unwrap_or_default();
    }

    if info.description.is_empty() {
        if let Some(description) =
            ctx.meta_content("og:description").or_else(|| ctx.meta_content("description"))
        {
            info.description = sanitize_description(&description);
        }
    }

    info
}

pub(crate) fn pricing(ctx: &PageContext) -> Pricing {
    // JSON-LD offers carry an explicit currency; trust them first.
    for product in ctx.json_ld_products() {
        if let Some((amount, currency)) = ld_offer(&product) {
            return Pricing {
                price: Money::new(amount, currency.unwrap_or_else(|| "EUR".to_string())),
                original_price: dom_original_price(ctx),
            };
        }
    }

    if let Some(amount) = ctx.meta_content("product:price:amount") {
        let currency = ctx.meta_content("product:price:currency").unwrap_or_else(|| "EUR".into());
        if let Some(value) = parse_amount(&amount) {
            return Pricing {
                price: Money::new(value, currency),
                original_price: dom_original_price(ctx),
            };
        }
    }

    let price =
        ctx.first_text(&sel::PRICE).map(|text| parse_price(&text)).unwrap_or_else(|| Money::zero("EUR"));
    Pricing { price, original_price: dom_original_price(ctx) }
}

fn dom_original_price(ctx: &PageContext) -> Option<Money> {
    let text = ctx.first_text(&sel::ORIGINAL_PRICE)?;
    let money = parse_price(&text);
    (!money.is_zero()).then_some(money)
}

pub(crate) fn images(ctx: &PageContext) -> Vec<String> {
    let mut candidates = Vec::new();

    for product in ctx.json_ld_products() {
        candidates.extend(ld_images(&product));
    }
    if let Some(og) = ctx.meta_content("og:image") {
        candidates.push(og);
    }
    candidates.extend(ctx.all_attrs(&sel::IMAGES, &["src", "data-src", "data-zoom-image", "data-old-hires"]));

    candidates
}

pub(crate) fn videos(ctx: &PageContext, platform: Platform) -> Vec<VideoRecord> {
    let mut videos: Vec<VideoRecord> = Vec::new();
    let mut push = |url: String, videos: &mut Vec<VideoRecord>| {
        if !url.is_empty() && !videos.iter().any(|v| v.url == url) {
            videos.push(VideoRecord::new(url, "mp4", platform.as_str()));
        }
    };

    for url in ctx.all_attrs(&sel::VIDEO, &["src", "data-src"]) {
        push(url, &mut videos);
    }

    for script in ctx.inline_scripts() {
        for caps in VIDEO_URL.captures_iter(&script) {
            let url = caps[1].replace("\\u002F", "/").replace('\\', "");
            push(url, &mut videos);
        }
    }

    videos
}

pub(crate) fn reviews(ctx: &PageContext) -> Vec<ReviewRecord> {
    let mut reviews = Vec::new();

    for product in ctx.json_ld_products() {
        if reviews.is_empty() {
            if let Some(aggregate) = product.get("aggregateRating") {
                let average = f64_field(aggregate, &["ratingValue"]).unwrap_or(5.0) as f32;
                let count = aggregate
                    .get("reviewCount")
                    .or_else(|| aggregate.get("ratingCount"))
                    .and_then(value_to_u32)
                    .unwrap_or(0);
                reviews.push(ReviewRecord::summary(average, count));
            }
        }

        if let Some(Value::Array(items)) = product.get("review") {
            for item in items {
                let author = match item.get("author") {
                    Some(Value::String(s)) => clean_text(s),
                    Some(obj @ Value::Object(_)) => {
                        str_field(obj, &["name"]).unwrap_or_default()
                    }
                    _ => String::new(),
                };
                let content = str_field(item, &["reviewBody", "description"]).unwrap_or_default();
                let date = str_field(item, &["datePublished"]).unwrap_or_default();
                let rating = item
                    .get("reviewRating")
                    .and_then(|r| f64_field(r, &["ratingValue"]))
                    .map(|v| v as f32);

                if !content.is_empty() || !author.is_empty() {
                    reviews.push(ReviewRecord::new(author, &content, date, rating));
                }
            }
        }
    }

    reviews
}

pub(crate) fn specifications(ctx: &PageContext) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();

    for selector in sel::SPEC_TABLE_ROW.iter() {
        for row in ctx.document().select(selector) {
            let cells: Vec<String> = row
                .select(&CELL)
                .map(|cell| clean_text(&cell.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect();
            if let [key, value] = cells.as_slice() {
                specs.entry(key.trim_end_matches(':').to_string()).or_insert_with(|| value.clone());
            }
        }
    }

    specs
}
