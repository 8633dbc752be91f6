//! eBay adapter: listing DOM, MSKU variation state, captured API data.
//!
//! This is the one adapter that reads the injected network capture:
//! review and item API responses observed by the page give better data
//! than the listing markup. Capture is best-effort - everything here
//! still works from the DOM alone.

use crate::extract::context::find_json_object;
use crate::extract::generic::{f64_field, str_field, value_to_u32};
use crate::extract::selectors::ebay as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, OptionChoice, ReviewRecord, VariantRecord};
use crate::normalize::price::parse_price;
use crate::normalize::text::{clean_text, sanitize_description};
use crate::variants::{generate, OptionGroup, OptionValue, DEFAULT_MAX_COMBINATIONS};
use serde_json::Value;
use std::collections::BTreeMap;

pub struct EbayExtractor;

impl Extractor for EbayExtractor {
    fn platform(&self) -> Platform {
        Platform::Ebay
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let title = ctx
            .first_text(&sel::TITLE)
            .map(|t| t.trim_start_matches("Details about").trim().to_string())
            .or_else(|| ctx.meta_content("og:title"))
            .unwrap_or_default();

        let brand = ctx.first_text(&sel::SELLER).unwrap_or_default();

        let description = ctx
            .meta_content("og:description")
            .or_else(|| ctx.meta_content("description"))
            .map(|d| sanitize_description(&d))
            .unwrap_or_default();

        let sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();

        BasicInfo { title, brand, description, sku }
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        let dom_price = ctx.first_text(&sel::PRICE).map(|text| parse_price(&text));

        // Captured item API responses carry a cleaner price than the
        // localized DOM string.
        let price = dom_price.filter(|money| !money.is_zero()).or_else(|| captured_price(ctx));

        let original_price = ctx
            .first_text(&sel::ORIGINAL_PRICE)
            .map(|text| parse_price(&text))
            .filter(|money| !money.is_zero());

        Pricing { price: price.unwrap_or_else(|| Money::zero("USD")), original_price }
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        ctx.all_attrs(&sel::IMAGES, &["data-zoom-src", "data-src", "src"])
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        // MSKU listings embed per-combination rows keyed
        // "Colour:Black|Size:M".
        if let Some(values) = variation_values(ctx) {
            let variants = parse_variation_values(&values);
            if !variants.is_empty() {
                return variants;
            }
        }

        // Only the axis menu present: synthesize the cross-product.
        if let Some(specifics) = variation_specifics(ctx) {
            let groups = parse_specifics_groups(&specifics);
            if !groups.is_empty() {
                return generate(&groups, DEFAULT_MAX_COMBINATIONS);
            }
        }

        Vec::new()
    }

    fn reviews(&self, ctx: &PageContext) -> Vec<ReviewRecord> {
        let mut reviews = Vec::new();

        // Captured review API responses first.
        for body in ctx.capture().reviews() {
            for item in review_items(body) {
                let author = str_field(&item, &["author", "userName", "buyerName"]).unwrap_or_default();
                let content =
                    str_field(&item, &["content", "text", "comment"]).unwrap_or_default();
                let date = str_field(&item, &["date", "creationDate"]).unwrap_or_default();
                let rating = f64_field(&item, &["rating", "stars"]).map(|v| v as f32);
                if !content.is_empty() {
                    reviews.push(ReviewRecord::new(author, &content, date, rating));
                }
            }
        }

        if !reviews.is_empty() {
            return reviews;
        }

        // Feedback cards in the listing markup.
        for selector in sel::REVIEW_ITEM.iter() {
            for item in ctx.document().select(selector) {
                let author = sel::REVIEW_AUTHOR
                    .iter()
                    .find_map(|s| item.select(s).next())
                    .map(|e| clean_text(&e.text().collect::<String>()))
                    .unwrap_or_default();
                let content = sel::REVIEW_CONTENT
                    .iter()
                    .find_map(|s| item.select(s).next())
                    .map(|e| clean_text(&e.text().collect::<String>()))
                    .unwrap_or_default();
                if !content.is_empty() {
                    reviews.push(ReviewRecord::new(author, &content, "", None));
                }
            }
            if !reviews.is_empty() {
                break;
            }
        }

        reviews
    }

    fn specifications(&self, ctx: &PageContext) -> BTreeMap<String, String> {
        let mut specs = BTreeMap::new();

        // Item specifics render as parallel label/value cell lists.
        let labels: Vec<String> = sel::SPEC_LABELS
            .iter()
            .flat_map(|s| ctx.document().select(s))
            .map(|e| clean_text(&e.text().collect::<String>()))
            .collect();
        let values: Vec<String> = sel::SPEC_VALUES
            .iter()
            .flat_map(|s| ctx.document().select(s))
            .map(|e| clean_text(&e.text().collect::<String>()))
            .collect();

        for (label, value) in labels.iter().zip(values.iter()) {
            let label = label.trim_end_matches(':');
            if !label.is_empty() && !value.is_empty() {
                specs.insert(label.to_string(), value.clone());
            }
        }

        if let Some(condition) = ctx.first_text(&sel::CONDITION) {
            specs.entry("Condition".to_string()).or_insert(condition);
        }

        specs
    }
}

fn captured_price(ctx: &PageContext) -> Option<Money> {
    for body in ctx.capture().product() {
        let price = body
            .get("currentPrice")
            .and_then(|p| f64_field(p, &["value"]))
            .or_else(|| f64_field(body, &["price", "currentPrice"]));
        if let Some(amount) = price {
            let currency = body
                .get("currentPrice")
                .and_then(|p| str_field(p, &["currency"]))
                .or_else(|| str_field(body, &["currency"]))
                .unwrap_or_else(|| "USD".to_string());
            return Some(Money::new(amount, currency));
        }
    }
    None
}

fn review_items(body: &Value) -> Vec<Value> {
    for key in ["reviews", "items", "feedback"] {
        if let Some(Value::Array(items)) = body.get(key) {
            return items.clone();
        }
    }
    Vec::new()
}

fn variation_values(ctx: &PageContext) -> Option<Value> {
    script_object(ctx, "\"variationValues\"").or_else(|| script_object(ctx, "variationValues"))
}

fn variation_specifics(ctx: &PageContext) -> Option<Value> {
    script_object(ctx, "\"variationSpecificsSet\"")
        .or_else(|| script_object(ctx, "variationSpecificsSet"))
}

fn script_object(ctx: &PageContext, marker: &str) -> Option<Value> {
    for script in ctx.inline_scripts() {
        if !script.contains(marker.trim_matches('"')) {
            continue;
        }
        if let Some(raw) = find_json_object(&script, marker) {
            if let Ok(value) = serde_json::from_str::<Value>(raw) {
                return Some(value);
            }
        }
    }
    None
}

/// Rows keyed "Colour:Black|Size:M" with per-combination data.
fn parse_variation_values(values: &Value) -> Vec<VariantRecord> {
    let Value::Object(entries) = values else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, (combo, data))| {
            let mut options = BTreeMap::new();
            for part in combo.split('|') {
                let (axis, value) = part.split_once(':')?;
                let (axis, value) = (axis.trim(), value.trim());
                if !axis.is_empty() && !value.is_empty() {
                    options.insert(axis.to_string(), OptionChoice::new(value));
                }
            }
            if options.is_empty() {
                return None;
            }

            let id = str_field(data, &["variationId"]).unwrap_or_else(|| format!("ebay-{index}"));
            let sku = str_field(data, &["sku"]).unwrap_or_default();
            let stock = data
                .get("quantity")
                .or_else(|| data.get("quantityAvailable"))
                .and_then(value_to_u32)
                .unwrap_or(0);

            let mut variant = VariantRecord::new(id, sku).with_stock(stock);
            variant.price = f64_field(data, &["price"]);
            variant.options = options;
            Some(variant)
        })
        .collect()
}

/// Axis menu only: `{"Colour": ["Black", "White"], "Size": [...]}`.
fn parse_specifics_groups(specifics: &Value) -> Vec<OptionGroup> {
    let Value::Object(axes) = specifics else {
        return Vec::new();
    };

    axes.iter()
        .filter_map(|(axis, values)| {
            let Value::Array(items) = values else {
                return None;
            };
            let values: Vec<OptionValue> = items
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(|s| OptionValue::new(clean_text(s)))
                .collect();
            (!values.is_empty()).then(|| OptionGroup::new(axis.clone(), values))
        })
        .collect()
}
