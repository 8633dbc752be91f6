//! Shein adapter: `productIntroData` state, JSON-LD, size radios.

use crate::extract::generic::{self, str_field, value_to_f64};
use crate::extract::selectors::shein as sel;
use crate::extract::{BasicInfo, Extractor, PageContext, Platform, Pricing};
use crate::model::{Money, VariantRecord};
use crate::normalize::text::clean_text;
use crate::variants::{generate, OptionGroup, OptionValue, DEFAULT_MAX_COMBINATIONS};
use serde_json::Value;

pub struct SheinExtractor;

fn intro_data(ctx: &PageContext) -> Option<Value> {
    ctx.script_json_after("productIntroData")
}

fn detail(intro: &Value) -> Option<&Value> {
    intro.get("detail").or(Some(intro))
}

impl Extractor for SheinExtractor {
    fn platform(&self) -> Platform {
        Platform::Shein
    }

    fn basic_info(&self, ctx: &PageContext) -> BasicInfo {
        let mut info = generic::basic_info(ctx);

        if let Some(intro) = intro_data(ctx) {
            if let Some(detail) = detail(&intro) {
                if info.title.is_empty() {
                    info.title = str_field(detail, &["goods_name"]).unwrap_or_default();
                }
                if info.sku.is_empty() {
                    info.sku = str_field(detail, &["goods_sn", "goods_id"]).unwrap_or_default();
                }
                if info.brand.is_empty() {
                    info.brand = str_field(detail, &["brand"]).unwrap_or_default();
                }
            }
        }

        if info.title.is_empty() {
            info.title = ctx.first_text(&sel::TITLE).unwrap_or_default();
        }
        if info.sku.is_empty() {
            info.sku = ctx.platform().extract_external_id(ctx.url()).unwrap_or_default();
        }

        info
    }

    fn pricing(&self, ctx: &PageContext) -> Pricing {
        if let Some(intro) = intro_data(ctx) {
            if let Some(detail) = detail(&intro) {
                let sale = detail
                    .pointer("/salePrice/amount")
                    .and_then(value_to_f64);
                if let Some(amount) = sale {
                    let original = detail
                        .pointer("/retailPrice/amount")
                        .and_then(value_to_f64)
                        .filter(|retail| *retail > amount);
                    return Pricing {
                        price: Money::new(amount, "USD"),
                        original_price: original.map(|o| Money::new(o, "USD")),
                    };
                }
            }
        }

        let mut pricing = generic::pricing(ctx);
        if pricing.price.is_zero() {
            if let Some(text) = ctx.first_text(&sel::PRICE) {
                pricing.price = crate::normalize::price::parse_price(&text);
            }
        }
        pricing
    }

    fn images(&self, ctx: &PageContext) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(intro) = intro_data(ctx) {
            if let Some(imgs) = intro.pointer("/goods_imgs/detail_image").and_then(Value::as_array)
            {
                for img in imgs {
                    if let Some(url) = str_field(img, &["origin_image"]) {
                        candidates.push(url);
                    }
                }
            }
            if let Some(main) = intro
                .pointer("/goods_imgs/main_image")
                .and_then(|m| str_field(m, &["origin_image"]))
            {
                candidates.insert(0, main);
            }
        }

        candidates.extend(generic::images(ctx));
        candidates.extend(ctx.all_attrs(&sel::IMAGES, &["data-src", "src"]));
        candidates
    }

    fn variants(&self, ctx: &PageContext) -> Vec<VariantRecord> {
        // Size radios are the one axis rendered server-side.
        let mut sizes = Vec::new();
        for selector in sel::SIZE_ITEM.iter() {
            for item in ctx.document().select(selector) {
                let label = item
                    .value()
                    .attr("aria-label")
                    .map(str::to_string)
                    .unwrap_or_else(|| clean_text(&item.text().collect::<String>()));
                if !label.is_empty() && !sizes.iter().any(|v: &OptionValue| v.name == label) {
                    sizes.push(OptionValue::new(label));
                }
            }
            if !sizes.is_empty() {
                break;
            }
        }

        if sizes.is_empty() {
            return Vec::new();
        }
        generate(&[OptionGroup::new("Size", sizes)], DEFAULT_MAX_COMBINATIONS)
    }
}
