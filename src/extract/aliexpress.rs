//! AliExpress adapter: `runParams` page state first, DOM second.

use crate::extract::generic::{self, f64_field, str_field, value_to_f64, value_to_u32};
use crate::extract::selectors::aliexpress as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, ReviewRecord, VariantRecord, VideoRecord};
use crate::normalize::price::parse_price;
use crate::normalize::rating::parse_rating;
use crate::normalize::text::{clean_text, sanitize_description};
use crate::variants::merge::{merge_offers, SkuOffer};
use crate::variants::{generate, OptionGroup, OptionValue, DEFAULT_MAX_COMBINATIONS};
use scraper::{ElementRef, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

pub struct AliExpressExtractor;

/// SPA state blob. `runParams` sometimes wraps the modules in a `data`
/// envelope; unwrap it so callers always see the module level.
fn page_data(ctx: &PageContext) -> Option<Value> {
    let raw = ctx
        .script_json_after("window.runParams")
        .or_else(|| ctx.script_json_after("runParams"))
        .or_else(|| ctx.script_json_after("__INIT_DATA__"))?;

    match raw.get("data") {
        Some(data @ Value::Object(_)) => Some(data.clone()),
        _ => Some(raw),
    }
}

impl Extractor for AliExpressExtractor {
    fn platform(&self) -> Platform {
        Platform::AliExpress
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let mut info = BasicInfo::default();

        if let Some(data) = page_data(ctx) {
            for module in ["titleModule", "pageModule"] {
                if let Some(title) =
                    data.get(module).and_then(|m| str_field(m, &["subject", "title"]))
                {
                    info.title = title;
                    break;
                }
            }
            if let Some(store) = data.get("storeModule") {
                info.brand = str_field(store, &["storeName"]).unwrap_or_default();
            }
        }

        if info.title.is_empty() {
            info.title = ctx.first_text(&sel::TITLE).unwrap_or_default();
        }
        if info.brand.is_empty() {
            info.brand = ctx.first_text(&sel::STORE).unwrap_or_default();
        }
        info.description =
            ctx.first_text(&sel::DESCRIPTION).map(|d| sanitize_description(&d)).unwrap_or_default();
        info.sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();

        info
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        if let Some(price_module) = page_data(ctx).and_then(|d| d.get("priceModule").cloned()) {
            let amount = price_module
                .get("minAmount")
                .or_else(|| price_module.get("activityAmount"))
                .and_then(|a| f64_field(a, &["value"]))
                .or_else(|| f64_field(&price_module, &["formattedActivityPrice"]));

            if let Some(amount) = amount {
                let currency = price_module
                    .get("minAmount")
                    .and_then(|a| str_field(a, &["currency"]))
                    .or_else(|| str_field(&price_module, &["currencyCode"]))
                    .unwrap_or_else(|| "USD".to_string());

                let original = price_module
                    .get("maxAmount")
                    .or_else(|| price_module.get("originalAmount"))
                    .and_then(|a| f64_field(a, &["value"]))
                    .filter(|original| *original > amount)
                    .map(|original| Money::new(original, currency.clone()));

                return Pricing { price: Money::new(amount, currency), original_price: original };
            }
        }

        let price = ctx
            .first_text(&sel::PRICE)
            .map(|text| parse_price(&text))
            .unwrap_or_else(|| Money::zero("USD"));
        let original_price = ctx
            .first_text(&sel::ORIGINAL_PRICE)
            .map(|text| parse_price(&text))
            .filter(|money| !money.is_zero());
        Pricing { price, original_price }
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(paths) = page_data(ctx)
            .and_then(|d| d.get("imageModule").and_then(|m| m.get("imagePathList")).cloned())
        {
            if let Value::Array(items) = paths {
                candidates.extend(items.iter().filter_map(|v| v.as_str().map(String::from)));
            }
        }

        candidates.extend(ctx.all_attrs(&sel::IMAGES, &["data-src", "src"]));
        candidates
    }

    fn videos(&self, ctx: &PageContext) -> Vec<VideoRecord> {
        let mut videos = Vec::new();

        // The gallery video is addressable from its upload id alone.
        if let Some(data) = page_data(ctx) {
            if let Some(uid) =
                data.get("imageModule").and_then(|m| str_field(m, &["videoUid"]))
            {
                let item_id = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();
                videos.push(VideoRecord::new(
                    format!("https://cloud.video.taobao.com/play/u/{uid}/p/1/e/6/t/1/{item_id}.mp4"),
                    "mp4",
                    "aliexpress",
                ));
            }
        }

        for video in generic::videos(ctx, Platform::AliExpress) {
            if !videos.iter().any(|v: &VideoRecord| v.url == video.url) {
                videos.push(video);
            }
        }
        videos
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        if let Some(sku_module) = page_data(ctx).and_then(|d| d.get("skuModule").cloned()) {
            let groups = option_groups(&sku_module);
            if !groups.is_empty() {
                let mut variants = generate(&groups, DEFAULT_MAX_COMBINATIONS);
                let offers = sku_offers(&sku_module);
                merge_offers(&mut variants, &offers);
                return variants;
            }
        }

        dom_variants(ctx)
    }

    fn reviews(&self, ctx: &PageContext) -> Vec<ReviewRecord> {
        let mut reviews = Vec::new();

        if let Some(feedback) = page_data(ctx).and_then(|d| d.get("feedbackModule").cloned()) {
            let average =
                f64_field(&feedback, &["evarageStar", "averageStar"]).unwrap_or(0.0) as f32;
            let count = feedback
                .get("totalValidNum")
                .or_else(|| feedback.get("reviewCount"))
                .and_then(value_to_u32)
                .unwrap_or(0);
            if average > 0.0 || count > 0 {
                reviews.push(ReviewRecord::summary(average, count));
            }
        }

        for selector in sel::REVIEW_ITEM.iter() {
            for item in ctx.document().select(selector) {
                if let Some(review) = dom_review(item) {
                    reviews.push(review);
                }
            }
            if reviews.iter().any(|r| r.kind == crate::model::ReviewKind::Review) {
                break;
            }
        }

        reviews
    }

    fn specifications(&self, ctx: &PageContext) -> BTreeMap<String, String> {
        let mut specs = BTreeMap::new();

        if let Some(props) = page_data(ctx)
            .and_then(|d| d.get("specsModule").and_then(|m| m.get("props")).cloned())
        {
            if let Value::Array(items) = props {
                for prop in items {
                    if let (Some(name), Some(value)) =
                        (str_field(&prop, &["attrName"]), str_field(&prop, &["attrValue"]))
                    {
                        specs.insert(name, value);
                    }
                }
            }
        }

        if specs.is_empty() {
            for selector in sel::SPEC_ROW.iter() {
                for row in ctx.document().select(selector) {
                    let text = clean_text(&row.text().collect::<String>());
                    if let Some((key, value)) = text.split_once(':') {
                        let (key, value) = (key.trim(), value.trim());
                        if !key.is_empty() && !value.is_empty() {
                            specs.insert(key.to_string(), value.to_string());
                        }
                    }
                }
            }
        }

        specs
    }
}

/// Option axes from `skuModule.productSKUPropertyList`.
fn option_groups(sku_module: &Value) -> Vec<OptionGroup> {
    let Some(Value::Array(properties)) = sku_module.get("productSKUPropertyList") else {
        return Vec::new();
    };

    properties
        .iter()
        .filter_map(|property| {
            let name = str_field(property, &["skuPropertyName"])?;
            let Some(Value::Array(raw_values)) = property.get("skuPropertyValues") else {
                return None;
            };

            let values: Vec<OptionValue> = raw_values
                .iter()
                .filter_map(|raw| {
                    let display =
                        str_field(raw, &["propertyValueDisplayName", "propertyValueName"])?;
                    let mut value = OptionValue::new(display);
                    if let Some(id) =
                        str_field(raw, &["propertyValueId", "propertyValueIdLong"])
                    {
                        value = value.with_id(id);
                    }
                    if let Some(image) = str_field(raw, &["skuPropertyImagePath"]) {
                        value = value.with_image(image);
                    }
                    Some(value)
                })
                .collect();

            (!values.is_empty()).then(|| OptionGroup::new(name, values))
        })
        .collect()
}

/// Per-SKU price/stock rows from `skuModule.skuPriceList`.
fn sku_offers(sku_module: &Value) -> Vec<SkuOffer> {
    let Some(Value::Array(rows)) = sku_module.get("skuPriceList") else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let sku_id = str_field(row, &["skuId", "skuIdStr"]).unwrap_or_default();
            let prop_ids: Vec<String> = str_field(row, &["skuPropIds"])
                .map(|ids| ids.split(',').filter(|s| !s.is_empty()).map(String::from).collect())
                .unwrap_or_default();

            if sku_id.is_empty() && prop_ids.is_empty() {
                return None;
            }

            let sku_val = row.get("skuVal").cloned().unwrap_or(Value::Null);
            let sale = sku_val.get("actSkuCalPrice").and_then(value_to_f64);
            let list = sku_val.get("skuCalPrice").and_then(value_to_f64);
            let stock = sku_val.get("availQuantity").and_then(value_to_u32).unwrap_or(0);

            Some(SkuOffer {
                sku_id,
                prop_ids,
                price: sale.or(list),
                original_price: list.filter(|l| Some(*l) != sale),
                stock,
            })
        })
        .collect()
}

/// DOM fallback: one group per `.sku-property` container.
fn dom_variants(ctx: &PageContext) -> Vec<VariantRecord> {
    let mut groups = Vec::new();

    for selector in sel::SKU_PROPERTY.iter() {
        for container in ctx.document().select(selector) {
            let name = sel::SKU_PROPERTY_NAME
                .iter()
                .find_map(|s| container.select(s).next())
                .map(|e| clean_text(&e.text().collect::<String>()))
                .map(|n| n.trim_end_matches(':').to_string());
            let Some(name) = name.filter(|n| !n.is_empty()) else {
                continue;
            };

            let mut values = Vec::new();
            for item_selector in sel::SKU_PROPERTY_ITEM.iter() {
                for item in container.select(item_selector) {
                    let label = item
                        .value()
                        .attr("title")
                        .map(str::to_string)
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| clean_text(&item.text().collect::<String>()));
                    if label.is_empty() {
                        continue;
                    }
                    let mut value = OptionValue::new(label);
                    if let Some(id) = item.value().attr("data-sku-id") {
                        value = value.with_id(id);
                    }
                    if let Some(img) = item.select(&IMG).next().and_then(|i| i.value().attr("src"))
                    {
                        value = value.with_image(img);
                    }
                    values.push(value);
                }
                if !values.is_empty() {
                    break;
                }
            }

            if !values.is_empty() {
                groups.push(OptionGroup::new(name, values));
            }
        }
        if !groups.is_empty() {
            break;
        }
    }

    generate(&groups, DEFAULT_MAX_COMBINATIONS)
}

/// One DOM feedback entry; entries without body text are skipped.
fn dom_review(item: ElementRef) -> Option<ReviewRecord> {
    let text_of = |chains: &[scraper::Selector]| {
        chains
            .iter()
            .find_map(|s| item.select(s).next())
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    };

    let content = text_of(&sel::REVIEW_CONTENT)?;
    let author = text_of(&sel::REVIEW_AUTHOR).unwrap_or_default();
    let date = text_of(&sel::REVIEW_DATE).unwrap_or_default();

    // Star bars encode the rating as a width percentage.
    let rating = sel::REVIEW_STARS
        .iter()
        .find_map(|s| item.select(s).next())
        .and_then(|e| e.value().attr("style").map(str::to_string))
        .as_deref()
        .and_then(parse_rating);

    Some(ReviewRecord::new(author, &content, date, rating))
}
